//! Country-level per-stream payout rates and blended rate computation

pub mod loader;

use crate::deal::{MarketMix, RowMode};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use loader::{load_country_rates, parse_currency, DEFAULT_RATES_PATH};

/// Per-stream payout rates for a single country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRate {
    pub country: String,
    pub audio_rate: f64,
    pub video_rate: f64,
}

/// One market's slice of a blended-rate breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSlice {
    pub country: String,
    pub share: f64,
    pub audio_rate: f64,
}

/// Per-country breakdown of a blended audio rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketBreakdown {
    pub markets: Vec<MarketSlice>,
    pub rest_of_world_share: f64,
    pub rest_of_world_rate: f64,
}

/// Resolve a lowercased country name through the alias table.
fn alias_target(name: &str) -> Option<&'static str> {
    let canonical = match name {
        "united states" | "us" | "usa" | "america" => "USA",
        "united kingdom" | "great britain" | "britain" | "england" | "uk" => "UK",
        "south korea" | "republic of korea" | "korea" => "KOREA",
        "hong kong sar" | "hong kong" => "HONG KONG",
        "uae" | "united arab emirates" => "UNITED ARAB EMIRATES",
        "netherlands" | "holland" => "NETHERLANDS",
        "russia" | "russian federation" => "RUSSIAN FEDERATION",
        "czech" | "czechia" | "czech republic" => "CZECH REPUBLIC",
        _ => return None,
    };
    Some(canonical)
}

/// Immutable table of country payout rates
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: BTreeMap<String, CountryRate>,
}

impl RateTable {
    /// Build a table from already-loaded rates.
    pub fn from_rates(rates: Vec<CountryRate>) -> Self {
        let rates = rates
            .into_iter()
            .map(|r| (r.country.to_uppercase(), r))
            .collect();
        Self { rates }
    }

    /// Load the table from a CSV rate file.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::from_rates(loader::load_country_rates(path)?))
    }

    /// Load the table from the bundled default file.
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(DEFAULT_RATES_PATH))
    }

    /// Available country names, sorted.
    pub fn list_countries(&self) -> Vec<&str> {
        self.rates.keys().map(String::as_str).collect()
    }

    /// Resolve a user-supplied country name to a table key.
    ///
    /// Tries direct match, then the alias table, then a case-insensitive
    /// partial match against loaded names.
    fn resolve(&self, country: &str) -> Result<&str> {
        let upper = country.trim().to_uppercase();
        if let Some((key, _)) = self.rates.get_key_value(&upper) {
            return Ok(key.as_str());
        }

        let lower = country.trim().to_lowercase();
        if let Some(alias) = alias_target(&lower) {
            if let Some((key, _)) = self.rates.get_key_value(alias) {
                return Ok(key.as_str());
            }
        }

        for key in self.rates.keys() {
            let key_lower = key.to_lowercase();
            if key_lower.contains(&lower) || lower.contains(&key_lower) {
                return Ok(key.as_str());
            }
        }

        Err(EngineError::UnknownCountry(country.to_string()))
    }

    /// Streaming rates for a country (alias matching applies).
    pub fn rate(&self, country: &str) -> Result<&CountryRate> {
        let key = self.resolve(country)?;
        Ok(&self.rates[key])
    }

    /// Audio rate for a country.
    pub fn audio_rate(&self, country: &str) -> Result<f64> {
        Ok(self.rate(country)?.audio_rate)
    }

    /// Video rate for a country.
    pub fn video_rate(&self, country: &str) -> Result<f64> {
        Ok(self.rate(country)?.video_rate)
    }

    /// Mean audio rate over countries with a strictly positive audio rate.
    pub fn average_audio(&self) -> f64 {
        Self::positive_mean(self.rates.values().map(|r| r.audio_rate))
    }

    /// Mean video rate over countries with a strictly positive video rate.
    pub fn average_video(&self) -> f64 {
        Self::positive_mean(self.rates.values().map(|r| r.video_rate))
    }

    fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
        let positive: Vec<f64> = values.filter(|v| *v > 0.0).collect();
        if positive.is_empty() {
            return 0.0;
        }
        positive.iter().sum::<f64>() / positive.len() as f64
    }

    /// Rest-of-world audio rate for the given mode.
    pub fn rest_of_world_rate(&self, row_mode: RowMode) -> Result<f64> {
        match row_mode {
            RowMode::Avg => Ok(self.average_audio()),
            RowMode::Us => self.audio_rate("USA"),
        }
    }

    /// Market-share-weighted audio rate with a rest-of-world component.
    ///
    /// `blend = sum(share_c * rate_c) + (1 - sum(share_c)) * row_rate`
    pub fn blend_audio(&self, mix: &MarketMix, row_mode: RowMode) -> Result<f64> {
        let total_share: f64 = mix.values().sum();
        if total_share > 1.0 {
            return Err(EngineError::InvalidMix(total_share));
        }

        let mut blended = 0.0;
        for (country, share) in mix {
            blended += share * self.audio_rate(country)?;
        }

        let rest_share = 1.0 - total_share;
        if rest_share > 0.0 {
            blended += rest_share * self.rest_of_world_rate(row_mode)?;
        }

        Ok(blended)
    }

    /// Per-country breakdown behind a blended audio rate.
    pub fn market_breakdown(&self, mix: &MarketMix, row_mode: RowMode) -> Result<MarketBreakdown> {
        let total_share: f64 = mix.values().sum();
        if total_share > 1.0 {
            return Err(EngineError::InvalidMix(total_share));
        }

        let mut markets = Vec::with_capacity(mix.len());
        for (country, share) in mix {
            let rate = self.rate(country)?;
            markets.push(MarketSlice {
                country: rate.country.clone(),
                share: *share,
                audio_rate: rate.audio_rate,
            });
        }

        Ok(MarketBreakdown {
            markets,
            rest_of_world_share: 1.0 - total_share,
            rest_of_world_rate: self.rest_of_world_rate(row_mode)?,
        })
    }
}
