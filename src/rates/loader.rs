//! CSV-based rate table loader
//!
//! Loads country-level per-stream payout rates from data/ppu_rates.csv.
//! Region aggregate rows and rows with all-zero rates are dropped at load.

use crate::error::{EngineError, Result};
use crate::rates::CountryRate;
use std::fs::File;
use std::path::Path;

/// Default path to the bundled rate table
pub const DEFAULT_RATES_PATH: &str = "data/ppu_rates.csv";

/// Region-total and non-country rows to drop
const EXCLUDED_COUNTRIES: &[&str] = &["AFRICA", "OTHERS"];

/// Raw CSV row matching ppu_rates.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Region")]
    _region: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Audio Rate")]
    audio_rate: String,
    #[serde(rename = "Video Rate")]
    video_rate: String,
}

/// Parse a currency cell like `" $     0.00307"` to a float.
///
/// Strips `$`, commas, and whitespace. Blank or unparseable cells are 0.0.
pub fn parse_currency(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}

/// Load country rates from a CSV file.
pub fn load_country_rates(path: &Path) -> Result<Vec<CountryRate>> {
    let file = File::open(path)
        .map_err(|e| EngineError::MissingCalibration(format!("{}: {}", path.display(), e)))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rates = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result
            .map_err(|e| EngineError::MissingCalibration(format!("{}: {}", path.display(), e)))?;

        // Region total rows carry no country of their own
        let country = row.country.trim().to_uppercase();
        if country.is_empty() || EXCLUDED_COUNTRIES.contains(&country.as_str()) {
            continue;
        }

        let audio_rate = parse_currency(&row.audio_rate);
        let video_rate = parse_currency(&row.video_rate);
        if audio_rate <= 0.0 && video_rate <= 0.0 {
            continue;
        }

        rates.push(CountryRate {
            country,
            audio_rate,
            video_rate,
        });
    }

    log::info!("loaded {} country rates from {}", rates.len(), path.display());
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_strips_decorations() {
        assert!((parse_currency(" $     0.00307") - 0.00307).abs() < 1e-12);
        assert!((parse_currency("$1,234.50") - 1234.5).abs() < 1e-9);
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("n/a"), 0.0);
    }

    #[test]
    fn test_load_bundled_rates() {
        let rates = load_country_rates(Path::new(DEFAULT_RATES_PATH)).unwrap();
        assert!(rates.len() >= 20);
        assert!(rates.iter().any(|r| r.country == "USA"));
        // Region aggregates must have been dropped
        assert!(!rates.iter().any(|r| r.country == "OTHERS"));
        assert!(rates.iter().all(|r| r.audio_rate > 0.0 || r.video_rate > 0.0));
    }
}
