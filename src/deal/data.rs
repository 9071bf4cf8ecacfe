//! Deal input data structures
//!
//! Everything here is a per-request value; nothing is shared across analyses
//! except the immutable calibration tables owned by the analyzer.

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Market-share mix for audio streams: country -> share of global streams.
///
/// Shares must each lie in [0, 1] and sum to at most 1.0; the remainder is
/// implicitly routed to the rest-of-world rate.
pub type MarketMix = BTreeMap<String, f64>;

/// Deal structure variants.
///
/// The single `deal_percent` knob is interpreted per variant: the label's
/// post-recoup share for `Distribution`, the label's share of net profit for
/// `ProfitSplit`, and the artist's royalty for `Royalty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    /// Label funds costs, takes 100% of gross until recouped, then splits
    Distribution,
    /// Expenses deducted from gross before a percentage split
    ProfitSplit,
    /// Fixed percentage of gross to the artist, no recoupment in-stream
    Royalty,
}

impl DealType {
    /// The label's base share of gross for a given deal percent.
    ///
    /// For royalty deals the input percent is the artist's royalty; the label
    /// retains the remainder.
    pub fn label_share(&self, deal_percent: f64) -> f64 {
        match self {
            DealType::Distribution | DealType::ProfitSplit => deal_percent,
            DealType::Royalty => 1.0 - deal_percent,
        }
    }
}

/// Decay projection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// Apply the calibrated annual multipliers directly to a flat year 1
    Annual,
    /// Build the 520-week level curve and anchor at the post-peak week
    #[default]
    Weekly,
}

/// Rest-of-world rate selection for the blended audio rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    /// Arithmetic mean over all countries with a positive rate
    #[default]
    Avg,
    /// Anchor the remainder to the USA rate
    Us,
}

/// Expense allocation policy for profit-split deals.
///
/// Only proportional allocation is implemented; the enum exists so alternative
/// policies (straight-line, weighted-early) stay an explicit configuration
/// point rather than a silent assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseAllocation {
    /// `expense_y = total_cost * gross_y / sum(gross)`
    #[default]
    ProportionalToGross,
}

/// Current streaming state of a single catalog track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackState {
    /// Caller-side identifier, echoed back untouched
    pub track_id: String,
    /// Whole weeks since the track's release (its age offset on the curve)
    pub weeks_since_release: u32,
    /// Current weekly audio streams
    pub weekly_audio: f64,
    /// Current weekly video streams
    pub weekly_video: f64,
}

impl TrackState {
    pub fn new(track_id: impl Into<String>, weeks_since_release: u32, weekly_audio: f64, weekly_video: f64) -> Self {
        Self {
            track_id: track_id.into(),
            weeks_since_release,
            weekly_audio,
            weekly_video,
        }
    }

    /// Build a track state from its release date, aging it to `as_of`.
    ///
    /// Releases dated in the future clamp to zero weeks.
    pub fn from_release_date(
        track_id: impl Into<String>,
        release_date: NaiveDate,
        as_of: NaiveDate,
        weekly_audio: f64,
        weekly_video: f64,
    ) -> Self {
        let days = (as_of - release_date).num_days().max(0);
        Self::new(track_id, (days / 7) as u32, weekly_audio, weekly_video)
    }
}

/// User inputs for a single deal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInputs {
    /// Genre for decay calibration lookup (alias matching applies)
    pub genre: String,
    /// Current weekly audio streams across the catalog
    pub weekly_audio: f64,
    /// Current weekly video streams across the catalog
    pub weekly_video: f64,
    /// Number of tracks in the existing catalog
    pub catalog_tracks: u32,
    /// New songs owed in the deal, modeled at catalog-average volume
    pub extra_tracks: u32,
    /// Audio market-share mix; remainder routed to rest-of-world
    pub market_mix: MarketMix,
    /// Deal structure
    pub deal_type: DealType,
    /// Deal percentage; interpretation depends on `deal_type`
    pub deal_percent: f64,
    /// Whether marketing spend is recoupable (Distribution deals)
    pub marketing_recoupable: bool,
    /// Fraction of total deal cost paid as advance
    pub advance_share: f64,
    /// Weeks the catalog is past its peak streaming week
    pub weeks_post_peak: u32,
    /// Decay projection mode
    pub decay_mode: DecayMode,
    /// Decay each track from its own age instead of the aggregate offset
    pub use_track_level: bool,
    /// Per-track catalog data; required for track-level decay
    pub tracks: Option<Vec<TrackState>>,
}

impl DealInputs {
    /// Minimal well-formed inputs for the given genre and volume.
    pub fn new(genre: impl Into<String>, weekly_audio: f64, weekly_video: f64) -> Self {
        Self {
            genre: genre.into(),
            weekly_audio,
            weekly_video,
            catalog_tracks: 1,
            extra_tracks: 0,
            market_mix: MarketMix::new(),
            deal_type: DealType::Distribution,
            deal_percent: 0.25,
            marketing_recoupable: false,
            advance_share: 0.70,
            weeks_post_peak: 0,
            decay_mode: DecayMode::default(),
            use_track_level: false,
            tracks: None,
        }
    }

    /// Validate request-level invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.weekly_audio.is_finite() || self.weekly_audio < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "weekly_audio must be >= 0, got {}",
                self.weekly_audio
            )));
        }
        if !self.weekly_video.is_finite() || self.weekly_video < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "weekly_video must be >= 0, got {}",
                self.weekly_video
            )));
        }
        if self.catalog_tracks < 1 {
            return Err(EngineError::InvalidInput(
                "catalog_tracks must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.deal_percent) {
            return Err(EngineError::InvalidInput(format!(
                "deal_percent must be within [0, 1], got {}",
                self.deal_percent
            )));
        }
        if !(0.0..=1.0).contains(&self.advance_share) {
            return Err(EngineError::InvalidInput(format!(
                "advance_share must be within [0, 1], got {}",
                self.advance_share
            )));
        }
        for (country, share) in &self.market_mix {
            if !(0.0..=1.0).contains(share) {
                return Err(EngineError::InvalidInput(format!(
                    "market share for {} must be within [0, 1], got {}",
                    country, share
                )));
            }
        }
        if let Some(tracks) = &self.tracks {
            for track in tracks {
                if track.weekly_audio < 0.0 || track.weekly_video < 0.0 {
                    return Err(EngineError::InvalidInput(format!(
                        "track {} has negative weekly streams",
                        track.track_id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Effective weekly audio streams after crediting the extra tracks at
    /// catalog-average volume.
    pub fn effective_weekly_audio(&self) -> f64 {
        let per_track = self.weekly_audio / self.catalog_tracks as f64;
        self.weekly_audio + self.extra_tracks as f64 * per_track
    }

    /// Effective weekly video streams, same convention as audio.
    pub fn effective_weekly_video(&self) -> f64 {
        let per_track = self.weekly_video / self.catalog_tracks as f64;
        self.weekly_video + self.extra_tracks as f64 * per_track
    }

    /// The label's base share of gross for these inputs.
    pub fn label_share(&self) -> f64 {
        self.deal_type.label_share(self.deal_percent)
    }
}

/// Engine-wide configuration with the documented defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rest-of-world handling for the blended audio rate
    pub row_mode: RowMode,
    /// Discount rate for NPV reporting
    pub discount_rate: f64,
    /// Discount rate applied to the displayed projection rows
    pub display_discount_rate: f64,
    /// Payback horizon for the payback-based recommendation
    pub payback_horizon_weeks: u32,
    /// IRR targets for the cost recommendations, ascending
    pub irr_targets: Vec<f64>,
    /// Expense allocation policy for profit-split deals
    pub expense_allocation: ExpenseAllocation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            row_mode: RowMode::Avg,
            discount_rate: 0.10,
            display_discount_rate: 0.075,
            payback_horizon_weeks: 78,
            irr_targets: vec![0.10, 0.15],
            expense_allocation: ExpenseAllocation::ProportionalToGross,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_share_by_deal_type() {
        assert_eq!(DealType::Distribution.label_share(0.25), 0.25);
        assert_eq!(DealType::ProfitSplit.label_share(0.50), 0.50);
        // Royalty percent is the artist's royalty; label keeps the rest
        assert!((DealType::Royalty.label_share(0.20) - 0.80).abs() < 1e-12);
    }

    #[test]
    fn test_effective_streams_credit_extra_tracks() {
        let mut inputs = DealInputs::new("Pop", 500_000.0, 100_000.0);
        inputs.catalog_tracks = 20;
        inputs.extra_tracks = 5;

        // 25,000 audio per track, 5 extras at that average
        assert!((inputs.effective_weekly_audio() - 625_000.0).abs() < 1e-9);
        assert!((inputs.effective_weekly_video() - 125_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        let mut inputs = DealInputs::new("Pop", -1.0, 0.0);
        assert!(inputs.validate().is_err());

        inputs.weekly_audio = 1000.0;
        inputs.deal_percent = 1.5;
        assert!(inputs.validate().is_err());

        inputs.deal_percent = 0.25;
        inputs.catalog_tracks = 0;
        assert!(inputs.validate().is_err());

        inputs.catalog_tracks = 10;
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_track_state_from_release_date() {
        let release = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        let track = TrackState::from_release_date("t1", release, as_of, 10_000.0, 500.0);
        assert_eq!(track.weeks_since_release, 26);

        // Future release clamps to zero
        let future = TrackState::from_release_date("t2", as_of, release, 0.0, 0.0);
        assert_eq!(future.weeks_since_release, 0);
    }
}
