//! Post-peak anchoring of the level curve
//!
//! The level curve assumes week 1 is peak, but a catalog is usually already
//! k weeks past peak when priced. Starting the user's current streams at
//! week 1 would decay them twice; instead the curve is anchored at week
//! (1 + k): the scale factor maps the curve level there onto the current
//! weekly streams, and the ten projection years become shifted 52-week
//! windows starting at the anchor. k = 0 is the unshifted special case.

use crate::decay::curve::{LevelCurve, CURVE_WEEKS, PROJECTION_YEARS};
use serde::{Deserialize, Serialize};

/// Ten-year revenue projection anchored at the post-peak week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftedProjection {
    /// Weeks the catalog is past its peak
    pub weeks_post_peak: u32,
    /// Model week the projection is anchored at (1 + k)
    pub anchor_week: usize,
    /// Curve level at the anchor week
    pub anchor_level: f64,
    /// Streams per level unit for audio: current_audio / L[anchor]
    pub scale_audio: f64,
    /// Streams per level unit for video: current_video / L[anchor]
    pub scale_video: f64,
    /// Audio revenue per shifted year
    pub annual_audio: [f64; PROJECTION_YEARS],
    /// Video revenue per shifted year
    pub annual_video: [f64; PROJECTION_YEARS],
    /// Total revenue per shifted year
    pub annual_totals: [f64; PROJECTION_YEARS],
    /// Annual multipliers relative to shifted year 1
    pub multipliers: [f64; PROJECTION_YEARS],
}

impl ShiftedProjection {
    /// Projected weekly audio streams at a 1-indexed model week.
    pub fn audio_at_week(&self, curve: &LevelCurve, week: usize) -> f64 {
        self.scale_audio * curve.level(week)
    }
}

/// Anchor the curve at week (1 + k) and project ten shifted years of
/// revenue.
///
/// At the anchor week the projected audio equals `current_audio` exactly;
/// zero stream inputs produce zero revenue rather than an error.
pub fn project_shifted(
    curve: &mut LevelCurve,
    weeks_post_peak: u32,
    current_audio: f64,
    current_video: f64,
    audio_rate: f64,
    video_rate: f64,
) -> ShiftedProjection {
    let k = weeks_post_peak as usize;
    curve.ensure_len(CURVE_WEEKS + k);

    let anchor_week = 1 + k;
    let anchor_level = curve.level(anchor_week);

    let scale_audio = if current_audio > 0.0 {
        current_audio / anchor_level
    } else {
        0.0
    };
    let scale_video = if current_video > 0.0 {
        current_video / anchor_level
    } else {
        0.0
    };

    let mut annual_audio = [0.0; PROJECTION_YEARS];
    let mut annual_video = [0.0; PROJECTION_YEARS];
    let mut annual_totals = [0.0; PROJECTION_YEARS];

    for year in 1..=PROJECTION_YEARS {
        let level_sum = curve.year_window_sum(year, k);
        annual_audio[year - 1] = scale_audio * level_sum * audio_rate;
        annual_video[year - 1] = scale_video * level_sum * video_rate;
        annual_totals[year - 1] = annual_audio[year - 1] + annual_video[year - 1];
    }

    let year1_total = annual_totals[0];
    let mut multipliers = [0.0; PROJECTION_YEARS];
    if year1_total > 0.0 {
        for (m, total) in multipliers.iter_mut().zip(annual_totals.iter()) {
            *m = total / year1_total;
        }
    }

    ShiftedProjection {
        weeks_post_peak,
        anchor_week,
        anchor_level,
        scale_audio,
        scale_video,
        annual_audio,
        annual_video,
        annual_totals,
        multipliers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::curve::WEEKS_PER_YEAR;

    fn sample_curve() -> LevelCurve {
        let multipliers = [1.0, 0.30, 0.21, 0.165, 0.14, 0.122, 0.109, 0.099, 0.091, 0.085];
        // Ten-week hold near peak, then steady decay
        let mut rates = vec![1.0; 10];
        rates.extend(std::iter::repeat(0.96).take(WEEKS_PER_YEAR - 10));
        LevelCurve::build(Some(&rates), &multipliers).unwrap()
    }

    #[test]
    fn test_anchor_point_matches_input_exactly() {
        let mut curve = sample_curve();
        let projection = project_shifted(&mut curve, 26, 480_000.0, 90_000.0, 0.003, 0.0008);

        assert_eq!(projection.anchor_week, 27);
        let projected = projection.audio_at_week(&curve, projection.anchor_week);
        assert!((projected - 480_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unshifted_is_the_zero_offset_case() {
        let mut curve = sample_curve();
        let s1 = curve.s1();
        let projection = project_shifted(&mut curve, 0, 100_000.0, 0.0, 0.003, 0.0008);

        assert_eq!(projection.anchor_week, 1);
        assert!((projection.anchor_level - 1.0).abs() < 1e-12);
        // Year 1 revenue is streams * S1 * rate when anchored at peak
        let expected = 100_000.0 * s1 * 0.003;
        assert!((projection.annual_totals[0] - expected).abs() / expected < 1e-12);
        assert!((projection.multipliers[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_post_peak_year_one_is_smaller_than_at_peak() {
        // Skipping the peak plateau leaves a smaller forward window relative
        // to the anchor level, so the same current streams project less
        // year-1 revenue.
        let mut at_peak = sample_curve();
        let mut post_peak = sample_curve();
        let peak_proj = project_shifted(&mut at_peak, 0, 480_000.0, 0.0, 0.003, 0.0008);
        let shifted_proj = project_shifted(&mut post_peak, 26, 480_000.0, 0.0, 0.003, 0.0008);

        assert!(shifted_proj.annual_totals[0] < peak_proj.annual_totals[0]);
    }

    #[test]
    fn test_shift_extends_curve_beyond_base_length() {
        let mut curve = sample_curve();
        let k = 40;
        let projection = project_shifted(&mut curve, k, 10_000.0, 0.0, 0.003, 0.0008);

        assert!(curve.len_weeks() >= CURVE_WEEKS + k as usize);
        // Year 10's shifted window sums strictly positive levels
        assert!(projection.annual_totals[PROJECTION_YEARS - 1] > 0.0);
    }

    #[test]
    fn test_zero_streams_produce_zero_revenue() {
        let mut curve = sample_curve();
        let projection = project_shifted(&mut curve, 12, 0.0, 0.0, 0.003, 0.0008);

        assert_eq!(projection.scale_audio, 0.0);
        assert!(projection.annual_totals.iter().all(|t| *t == 0.0));
        assert!(projection.multipliers.iter().all(|m| *m == 0.0));
    }
}
