//! Decay calibration, level-curve construction, and anchored projections

pub mod calibration;
pub mod curve;
pub mod shifted;
pub mod tracks;

pub use calibration::{CalibrationTable, DecayCalibration, DEFAULT_DECAY_PATH};
pub use curve::{solve_year_factor, FactorSolve, LevelCurve, CURVE_WEEKS, PROJECTION_YEARS, WEEKS_PER_YEAR};
pub use shifted::{project_shifted, ShiftedProjection};
pub use tracks::{project_tracks, TrackProjection};
