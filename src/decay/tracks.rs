//! Track-level revenue aggregation
//!
//! Each track is anchored on the shared unshifted curve at its own age
//! offset and projected forward ten years; the aggregate annual totals are
//! the sum over tracks. Extra tracks owed in the deal are pseudo-tracks at
//! peak with catalog-average per-track streams.

use crate::deal::TrackState;
use crate::decay::curve::{LevelCurve, CURVE_WEEKS, PROJECTION_YEARS};
use serde::{Deserialize, Serialize};

/// Aggregate ten-year projection from per-track decay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackProjection {
    /// Audio revenue per year, summed over tracks
    pub annual_audio: [f64; PROJECTION_YEARS],
    /// Video revenue per year, summed over tracks
    pub annual_video: [f64; PROJECTION_YEARS],
    /// Total revenue per year
    pub annual_totals: [f64; PROJECTION_YEARS],
    /// Effective annual multipliers relative to aggregate year 1, when the
    /// aggregate year 1 is positive
    pub multipliers: Option<[f64; PROJECTION_YEARS]>,
    /// Total current weekly audio streams across tracks and extras
    pub total_weekly_audio: f64,
    /// Total current weekly video streams across tracks and extras
    pub total_weekly_video: f64,
    /// Number of tracks modeled, extras included
    pub track_count: usize,
}

/// Accumulate one anchored stream source into the annual totals.
fn accumulate(
    curve: &LevelCurve,
    offset_weeks: usize,
    weekly_audio: f64,
    weekly_video: f64,
    audio_rate: f64,
    video_rate: f64,
    annual_audio: &mut [f64; PROJECTION_YEARS],
    annual_video: &mut [f64; PROJECTION_YEARS],
) {
    let anchor_level = curve.level(1 + offset_weeks);
    if anchor_level <= 0.0 {
        return;
    }
    let scale_audio = if weekly_audio > 0.0 {
        weekly_audio / anchor_level
    } else {
        0.0
    };
    let scale_video = if weekly_video > 0.0 {
        weekly_video / anchor_level
    } else {
        0.0
    };
    if scale_audio == 0.0 && scale_video == 0.0 {
        return;
    }

    for year in 1..=PROJECTION_YEARS {
        let level_sum = curve.year_window_sum(year, offset_weeks);
        annual_audio[year - 1] += scale_audio * level_sum * audio_rate;
        annual_video[year - 1] += scale_video * level_sum * video_rate;
    }
}

/// Decay each track from its own age offset and aggregate the ten-year
/// revenues.
pub fn project_tracks(
    curve: &mut LevelCurve,
    tracks: &[TrackState],
    extra_tracks: u32,
    audio_rate: f64,
    video_rate: f64,
) -> TrackProjection {
    let max_offset = tracks
        .iter()
        .map(|t| t.weeks_since_release as usize)
        .max()
        .unwrap_or(0);
    curve.ensure_len(CURVE_WEEKS + max_offset);

    let mut annual_audio = [0.0; PROJECTION_YEARS];
    let mut annual_video = [0.0; PROJECTION_YEARS];
    let mut total_weekly_audio = 0.0;
    let mut total_weekly_video = 0.0;

    for track in tracks {
        total_weekly_audio += track.weekly_audio;
        total_weekly_video += track.weekly_video;
        accumulate(
            curve,
            track.weeks_since_release as usize,
            track.weekly_audio,
            track.weekly_video,
            audio_rate,
            video_rate,
            &mut annual_audio,
            &mut annual_video,
        );
    }

    // Extra tracks sit at peak with catalog-average per-track streams
    if extra_tracks > 0 && !tracks.is_empty() {
        let avg_audio = total_weekly_audio / tracks.len() as f64;
        let avg_video = total_weekly_video / tracks.len() as f64;
        let extras = extra_tracks as f64;
        accumulate(
            curve,
            0,
            avg_audio * extras,
            avg_video * extras,
            audio_rate,
            video_rate,
            &mut annual_audio,
            &mut annual_video,
        );
        total_weekly_audio += avg_audio * extras;
        total_weekly_video += avg_video * extras;
    }

    let mut annual_totals = [0.0; PROJECTION_YEARS];
    for year in 0..PROJECTION_YEARS {
        annual_totals[year] = annual_audio[year] + annual_video[year];
    }

    let multipliers = if annual_totals[0] > 0.0 {
        let mut m = [0.0; PROJECTION_YEARS];
        for (slot, total) in m.iter_mut().zip(annual_totals.iter()) {
            *slot = total / annual_totals[0];
        }
        Some(m)
    } else {
        None
    };

    TrackProjection {
        annual_audio,
        annual_video,
        annual_totals,
        multipliers,
        total_weekly_audio,
        total_weekly_video,
        track_count: tracks.len() + extra_tracks as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::curve::WEEKS_PER_YEAR;
    use crate::decay::shifted::project_shifted;

    fn sample_curve() -> LevelCurve {
        let multipliers = [1.0, 0.34, 0.25, 0.20, 0.17, 0.15, 0.135, 0.123, 0.113, 0.105];
        let mut rates = vec![1.0; 6];
        rates.extend(std::iter::repeat(0.968).take(WEEKS_PER_YEAR - 6));
        LevelCurve::build(Some(&rates), &multipliers).unwrap()
    }

    #[test]
    fn test_single_track_at_peak_matches_aggregate() {
        let mut curve_a = sample_curve();
        let mut curve_b = sample_curve();

        let tracks = vec![TrackState::new("t1", 0, 500_000.0, 100_000.0)];
        let track_proj = project_tracks(&mut curve_a, &tracks, 0, 0.003, 0.0008);
        let agg_proj = project_shifted(&mut curve_b, 0, 500_000.0, 100_000.0, 0.003, 0.0008);

        for year in 0..PROJECTION_YEARS {
            let a = track_proj.annual_totals[year];
            let b = agg_proj.annual_totals[year];
            assert!(
                (a - b).abs() / b < 1e-6,
                "year {}: track {} vs aggregate {}",
                year + 1,
                a,
                b
            );
        }
    }

    #[test]
    fn test_older_track_projects_less_than_fresh_track() {
        // Long hold near peak, then steep decay: an aged track anchors past
        // the plateau and its forward window shrinks relative to the anchor
        let multipliers = [1.0, 0.30, 0.21, 0.165, 0.14, 0.122, 0.109, 0.099, 0.091, 0.085];
        let mut rates = vec![1.0; 10];
        rates.extend(std::iter::repeat(0.96).take(WEEKS_PER_YEAR - 10));
        let mut curve_a = LevelCurve::build(Some(&rates), &multipliers).unwrap();
        let mut curve_b = curve_a.clone();

        let fresh = vec![TrackState::new("t1", 0, 100_000.0, 0.0)];
        let aged = vec![TrackState::new("t1", 30, 100_000.0, 0.0)];
        let fresh_proj = project_tracks(&mut curve_a, &fresh, 0, 0.003, 0.0008);
        let aged_proj = project_tracks(&mut curve_b, &aged, 0, 0.003, 0.0008);

        assert!(aged_proj.annual_totals[0] < fresh_proj.annual_totals[0]);
    }

    #[test]
    fn test_extra_tracks_add_catalog_average_at_peak() {
        let mut base_curve = sample_curve();
        let mut extra_curve = sample_curve();

        let tracks = vec![
            TrackState::new("t1", 0, 60_000.0, 10_000.0),
            TrackState::new("t2", 0, 40_000.0, 6_000.0),
        ];
        let base = project_tracks(&mut base_curve, &tracks, 0, 0.003, 0.0008);
        let with_extras = project_tracks(&mut extra_curve, &tracks, 2, 0.003, 0.0008);

        // Two extras at the 50k/8k average double the aggregate
        assert!((with_extras.total_weekly_audio - 200_000.0).abs() < 1e-9);
        for year in 0..PROJECTION_YEARS {
            let expected = base.annual_totals[year] * 2.0;
            assert!((with_extras.annual_totals[year] - expected).abs() / expected < 1e-9);
        }
        assert_eq!(with_extras.track_count, 4);
    }

    #[test]
    fn test_empty_catalog_projects_zero() {
        let mut curve = sample_curve();
        let projection = project_tracks(&mut curve, &[], 3, 0.003, 0.0008);

        assert!(projection.annual_totals.iter().all(|t| *t == 0.0));
        assert!(projection.multipliers.is_none());
    }
}
