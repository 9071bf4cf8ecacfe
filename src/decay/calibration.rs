//! Genre decay calibration loader
//!
//! Parses data/decay_model.csv into per-genre calibration records: ten annual
//! revenue multipliers (Year 1 = 1.0) and, where the sheet provides them,
//! 52 week-over-week rates for year 1.
//!
//! The sheet layout has a `Weeks` column whose rows run 0..52 and then carry
//! the `Year 1`..`Year 10` anchors; each genre contributes a `<Genre> Revenue`
//! column (week 0 and year anchors) and optionally a `<Genre> Rates` column
//! (the 52 weekly rates on the week 1..52 rows).

use crate::decay::curve::{PROJECTION_YEARS, WEEKS_PER_YEAR};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the bundled decay calibration
pub const DEFAULT_DECAY_PATH: &str = "data/decay_model.csv";

/// Calibrated decay data for one genre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayCalibration {
    /// Canonical genre name as it appears in the calibration sheet
    pub genre: String,
    /// Annual revenue multipliers relative to year 1 (index 0 = year 1 = 1.0)
    pub annual_multipliers: [f64; PROJECTION_YEARS],
    /// Week-over-week multipliers for year 1, when the sheet provides them
    pub weekly_rates: Option<Vec<f64>>,
}

/// Resolve a lowercased genre name through the alias table.
fn alias_target(name: &str) -> Option<&'static str> {
    let canonical = match name {
        "pop" => "Pop",
        "urban" | "hip-hop" | "hiphop" | "hip hop" | "r&b" | "rnb" | "rap" => "Urban",
        "rock" => "Rock",
        "dance" | "electronic" | "electronica" | "edm" => "Electronic",
        "singer" | "songwriter" | "singer/songwriter" | "singer-songwriter" => "Singer-Songwriter",
        "jpop" | "kpop" | "j-pop" | "k-pop" => "J-Pop & K-Pop",
        _ => return None,
    };
    Some(canonical)
}

/// Immutable table of per-genre decay calibrations
#[derive(Debug, Clone)]
pub struct CalibrationTable {
    genres: BTreeMap<String, DecayCalibration>,
}

impl CalibrationTable {
    /// Load calibrations from a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| EngineError::MissingCalibration(format!("{}: {}", path.display(), e)))?;
        let table = Self::from_reader(file)?;
        log::info!(
            "loaded decay calibrations for {} genres from {}",
            table.genres.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load calibrations from the bundled default file.
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(DEFAULT_DECAY_PATH))
    }

    /// Parse the calibration sheet from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| EngineError::MissingCalibration(e.to_string()))?
            .clone();

        // Column layout: genre revenue and rates columns keyed by header suffix
        let mut revenue_cols: BTreeMap<String, usize> = BTreeMap::new();
        let mut rates_cols: BTreeMap<String, usize> = BTreeMap::new();
        let mut weeks_col = None;
        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim();
            if header.eq_ignore_ascii_case("weeks") {
                weeks_col = Some(idx);
            } else if let Some(genre) = header.strip_suffix(" Revenue") {
                revenue_cols.insert(genre.to_string(), idx);
            } else if let Some(genre) = header.strip_suffix(" Rates") {
                rates_cols.insert(genre.to_string(), idx);
            }
        }
        let weeks_col = weeks_col.ok_or_else(|| {
            EngineError::MissingCalibration("decay sheet has no Weeks column".to_string())
        })?;

        // Row contents: year anchors and weekly rate rows keyed by the Weeks cell
        let mut year_values: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();
        let mut weekly_values: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();

        for record in csv_reader.records() {
            let record =
                record.map_err(|e| EngineError::MissingCalibration(e.to_string()))?;
            let label = record.get(weeks_col).unwrap_or("").trim();

            if let Some(year_str) = label.strip_prefix("Year ") {
                let Ok(year) = year_str.trim().parse::<u32>() else {
                    continue;
                };
                if !(1..=PROJECTION_YEARS as u32).contains(&year) {
                    continue;
                }
                for (genre, col) in &revenue_cols {
                    if let Some(value) = parse_cell(record.get(*col)) {
                        year_values.entry(genre.clone()).or_default().insert(year, value);
                    }
                }
            } else if let Ok(week) = label.parse::<u32>() {
                if !(1..=WEEKS_PER_YEAR as u32).contains(&week) {
                    continue;
                }
                for (genre, col) in &rates_cols {
                    if let Some(value) = parse_cell(record.get(*col)) {
                        weekly_values.entry(genre.clone()).or_default().insert(week, value);
                    }
                }
            }
        }

        let mut genres = BTreeMap::new();
        for (genre, years) in &year_values {
            let calibration = build_calibration(
                genre,
                years,
                rates_cols.contains_key(genre),
                weekly_values.get(genre),
            )?;
            genres.insert(genre.clone(), calibration);
        }

        if genres.is_empty() {
            return Err(EngineError::MissingCalibration(
                "decay sheet contains no genre columns".to_string(),
            ));
        }

        Ok(Self { genres })
    }

    /// Available genre names, sorted.
    pub fn list_genres(&self) -> Vec<&str> {
        self.genres.keys().map(String::as_str).collect()
    }

    /// Resolve a user-supplied genre to a calibration key.
    fn resolve(&self, genre: &str) -> Result<&str> {
        let trimmed = genre.trim();
        if let Some((key, _)) = self
            .genres
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(trimmed))
        {
            return Ok(key.as_str());
        }

        let lower = trimmed.to_lowercase();
        if let Some(alias) = alias_target(&lower) {
            if let Some((key, _)) = self.genres.get_key_value(alias) {
                return Ok(key.as_str());
            }
        }

        for key in self.genres.keys() {
            let key_lower = key.to_lowercase();
            if key_lower.contains(&lower) || lower.contains(&key_lower) {
                return Ok(key.as_str());
            }
        }

        Err(EngineError::UnknownGenre(genre.to_string()))
    }

    /// Full calibration record for a genre (alias matching applies).
    pub fn calibration(&self, genre: &str) -> Result<&DecayCalibration> {
        let key = self.resolve(genre)?;
        Ok(&self.genres[key])
    }

    /// Normalized annual multipliers for a genre, year 1 = 1.0.
    pub fn annual_multipliers(&self, genre: &str) -> Result<[f64; PROJECTION_YEARS]> {
        Ok(self.calibration(genre)?.annual_multipliers)
    }

    /// Year-1 weekly rates for a genre, or `None` if the sheet has none.
    pub fn weekly_rates(&self, genre: &str) -> Result<Option<&[f64]>> {
        Ok(self.calibration(genre)?.weekly_rates.as_deref())
    }
}

fn parse_cell(cell: Option<&str>) -> Option<f64> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

fn build_calibration(
    genre: &str,
    years: &BTreeMap<u32, f64>,
    has_rates_column: bool,
    weeks: Option<&BTreeMap<u32, f64>>,
) -> Result<DecayCalibration> {
    let mut values = [0.0; PROJECTION_YEARS];
    for year in 1..=PROJECTION_YEARS as u32 {
        values[year as usize - 1] = *years.get(&year).ok_or_else(|| EngineError::MissingYear {
            year,
            genre: genre.to_string(),
        })?;
    }

    // Rescale so year 1 = 1.0; the sheet stores absolute revenue anchors
    let year1 = values[0];
    if year1 <= 0.0 {
        return Err(EngineError::MissingCalibration(format!(
            "{}: Year 1 revenue must be positive, got {}",
            genre, year1
        )));
    }
    let mut multipliers = [0.0; PROJECTION_YEARS];
    for (m, v) in multipliers.iter_mut().zip(values.iter()) {
        *m = v / year1;
        if *m <= 0.0 {
            return Err(EngineError::MissingCalibration(format!(
                "{}: annual multipliers must be positive, got {}",
                genre, m
            )));
        }
    }

    let weekly_rates = if has_rates_column {
        let weeks = weeks.ok_or_else(|| {
            EngineError::MissingCalibration(format!("{}: Rates column has no values", genre))
        })?;
        let mut rates = Vec::with_capacity(WEEKS_PER_YEAR);
        for week in 1..=WEEKS_PER_YEAR as u32 {
            let rate = *weeks.get(&week).ok_or_else(|| {
                EngineError::MissingCalibration(format!(
                    "{}: missing weekly rate for week {}",
                    genre, week
                ))
            })?;
            if rate <= 0.0 {
                return Err(EngineError::MissingCalibration(format!(
                    "{}: weekly rate for week {} must be positive, got {}",
                    genre, week, rate
                )));
            }
            rates.push(rate);
        }
        Some(rates)
    } else {
        None
    };

    Ok(DecayCalibration {
        genre: genre.to_string(),
        annual_multipliers: multipliers,
        weekly_rates,
    })
}
