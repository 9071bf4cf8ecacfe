//! Catalog Pricer - Deal pricing and projection engine for recorded-music catalogs
//!
//! This library provides:
//! - Country-level payout rates with market-share blending
//! - Genre decay calibration and 520-week level-curve construction
//! - Post-peak anchoring and per-track decay aggregation
//! - Cash-flow models for distribution, profit-split, and royalty deals
//! - IRR / NPV / payback solvers and deal-cost recommendations

pub mod analyzer;
pub mod cashflow;
pub mod deal;
pub mod decay;
pub mod error;
pub mod rates;
pub mod valuation;

// Re-export commonly used types
pub use analyzer::{DealAnalyzer, RecommendationResult, ViabilityResult};
pub use cashflow::{CashFlowEngine, YearlyCashFlow};
pub use deal::{DealInputs, DealType, DecayMode, EngineConfig, RowMode, TrackState};
pub use decay::{CalibrationTable, DecayCalibration, LevelCurve};
pub use error::{EngineError, Result};
pub use rates::{CountryRate, RateTable};
pub use valuation::{ArtistMetrics, IrrRecommendation, LabelMetrics, PaybackRecommendation};
