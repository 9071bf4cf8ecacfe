//! Weekly cash-flow simulation with the recoupment withholding waterfall
//!
//! Payback math runs at weekly granularity: each year's gross is allocated
//! evenly across its 52 weeks, the base split is applied, and while a
//! recoupable balance remains the label withholds the artist's share on top
//! of its own. Used by the payback solvers; the annual engine keeps its own
//! coarser waterfall for the projection rows.

use crate::decay::{PROJECTION_YEARS, WEEKS_PER_YEAR};
use serde::{Deserialize, Serialize};

use super::engine::recoupable_amount;

/// Cumulative milestone weeks reported by the waterfall
const MILESTONE_18_MONTHS: usize = 78;
const MILESTONE_24_MONTHS: usize = 104;

/// Result of a weekly waterfall simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyWaterfall {
    /// Label cash inflow per week (base share plus withheld recoupment)
    pub label_in: Vec<f64>,
    /// Artist payout per week after withholding
    pub artist_out: Vec<f64>,
    /// Week the recoupable balance reaches zero, if it does
    pub recoup_week: Option<u32>,
    /// The recoupable balance the simulation started from
    pub recoupable: f64,
    /// Cumulative label cash at week 78
    pub cum_label_78: f64,
    /// Cumulative label cash at week 104
    pub cum_label_104: f64,
    /// Cumulative label cash over the full series
    pub cum_label_total: f64,
}

/// Allocate each year's gross evenly across its 52 weeks.
pub fn weekly_gross_series(year1_gross: f64, multipliers: &[f64; PROJECTION_YEARS]) -> Vec<f64> {
    let mut series = Vec::with_capacity(PROJECTION_YEARS * WEEKS_PER_YEAR);
    for multiplier in multipliers {
        let weekly = year1_gross * multiplier / WEEKS_PER_YEAR as f64;
        series.extend(std::iter::repeat(weekly).take(WEEKS_PER_YEAR));
    }
    series
}

/// Simulate the weekly recoupment waterfall.
///
/// While the recoupable balance is open the label receives its base share
/// plus the withheld artist share; the artist receives the remainder (zero
/// until recouped when the withholding covers their full share).
pub fn simulate_waterfall(
    weekly_gross: &[f64],
    label_share: f64,
    total_cost: f64,
    advance_share: f64,
    marketing_recoupable: bool,
) -> WeeklyWaterfall {
    let recoupable = recoupable_amount(total_cost, advance_share, marketing_recoupable);
    let artist_share = 1.0 - label_share;

    let mut label_in = Vec::with_capacity(weekly_gross.len());
    let mut artist_out = Vec::with_capacity(weekly_gross.len());
    let mut remaining = recoupable;
    let mut recoup_week = None;
    let mut cum_label_78 = 0.0;
    let mut cum_label_104 = 0.0;
    let mut cum_label_total = 0.0;

    for (idx, gross) in weekly_gross.iter().enumerate() {
        let week = idx + 1;
        let label_base = gross * label_share;
        let artist_due = gross * artist_share;

        let (label, artist) = if remaining > 0.0 {
            let withheld = artist_due.min(remaining);
            remaining -= withheld;
            if remaining <= 0.0 && recoup_week.is_none() {
                recoup_week = Some(week as u32);
            }
            (label_base + withheld, artist_due - withheld)
        } else {
            (label_base, artist_due)
        };

        cum_label_total += label;
        if week == MILESTONE_18_MONTHS {
            cum_label_78 = cum_label_total;
        }
        if week == MILESTONE_24_MONTHS {
            cum_label_104 = cum_label_total;
        }

        label_in.push(label);
        artist_out.push(artist);
    }

    if weekly_gross.len() < MILESTONE_18_MONTHS {
        cum_label_78 = cum_label_total;
    }
    if weekly_gross.len() < MILESTONE_24_MONTHS {
        cum_label_104 = cum_label_total;
    }

    WeeklyWaterfall {
        label_in,
        artist_out,
        recoup_week,
        recoupable,
        cum_label_78,
        cum_label_104,
        cum_label_total,
    }
}

/// First week at which cumulative label inflow reaches the total deal cost,
/// or `None` if the series never pays back.
pub fn payback_week(
    weekly_gross: &[f64],
    label_share: f64,
    total_cost: f64,
    advance_share: f64,
    marketing_recoupable: bool,
) -> Option<u32> {
    if total_cost <= 0.0 {
        return Some(0);
    }
    let waterfall = simulate_waterfall(
        weekly_gross,
        label_share,
        total_cost,
        advance_share,
        marketing_recoupable,
    );

    let mut cumulative = 0.0;
    for (idx, label) in waterfall.label_in.iter().enumerate() {
        cumulative += label;
        if cumulative >= total_cost {
            return Some(idx as u32 + 1);
        }
    }
    None
}

/// Aggregate a weekly series into annual sums.
pub fn annualize(weekly: &[f64]) -> Vec<f64> {
    weekly
        .chunks(WEEKS_PER_YEAR)
        .map(|chunk| chunk.iter().sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTS: [f64; PROJECTION_YEARS] =
        [1.0, 0.34, 0.25, 0.20, 0.17, 0.15, 0.135, 0.123, 0.113, 0.105];

    #[test]
    fn test_weekly_series_preserves_annual_totals() {
        let series = weekly_gross_series(1_040_000.0, &MULTS);
        assert_eq!(series.len(), 520);

        let annual = annualize(&series);
        assert!((annual[0] - 1_040_000.0).abs() < 1e-6);
        assert!((annual[1] - 1_040_000.0 * 0.34).abs() < 1e-6);
    }

    #[test]
    fn test_waterfall_withholds_artist_share_until_recouped() {
        // Flat $10k weekly gross, 25/75 split, $30k advance-only recoupable
        let gross = vec![10_000.0; 20];
        let waterfall = simulate_waterfall(&gross, 0.25, 30_000.0 / 0.7, 0.7, false);

        assert!((waterfall.recoupable - 30_000.0).abs() < 1e-9);
        // Weeks 1-4: artist share is 7500/week, so recoup completes week 4
        assert_eq!(waterfall.recoup_week, Some(4));
        assert!((waterfall.label_in[0] - 10_000.0).abs() < 1e-9);
        assert_eq!(waterfall.artist_out[0], 0.0);
        // Week 4 withholds the residual 7500 * 3 = 22500, leaves 7500 needed
        assert!((waterfall.label_in[3] - 2_500.0 - 7_500.0).abs() < 1e-9);
        assert!((waterfall.artist_out[3] - 0.0).abs() < 1e-9);
        // Week 5 reverts to the base split
        assert!((waterfall.label_in[4] - 2_500.0).abs() < 1e-9);
        assert!((waterfall.artist_out[4] - 7_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_payback_week_includes_base_share() {
        let gross = vec![10_000.0; 30];
        // Cost 40k, fully recoupable: label gets 10k/week while withholding
        let week = payback_week(&gross, 0.25, 40_000.0, 0.7, true);
        assert_eq!(week, Some(4));

        // Advance-only recoup (28k): cumulative label runs 10k, 20k, 30k,
        // 38k (withholding ends mid-week 4), then 2.5k/week onward
        let week = payback_week(&gross, 0.25, 40_000.0, 0.7, false);
        assert_eq!(week, Some(5));
    }

    #[test]
    fn test_payback_never_reached_on_zero_gross() {
        let gross = vec![0.0; 520];
        assert_eq!(payback_week(&gross, 0.25, 1_000.0, 0.7, false), None);

        let waterfall = simulate_waterfall(&gross, 0.25, 1_000.0, 0.7, false);
        assert_eq!(waterfall.recoup_week, None);
        assert_eq!(waterfall.cum_label_total, 0.0);
    }

    #[test]
    fn test_milestone_cumulative_values() {
        let series = weekly_gross_series(520_000.0, &MULTS);
        let waterfall = simulate_waterfall(&series, 0.25, 0.0, 0.7, false);

        // No recoupment: label collects its base share each week
        let weekly_label_year1 = 520_000.0 / 52.0 * 0.25;
        let weekly_label_year2 = 520_000.0 * 0.34 / 52.0 * 0.25;
        let expected_78 = weekly_label_year1 * 52.0 + weekly_label_year2 * 26.0;
        assert!((waterfall.cum_label_78 - expected_78).abs() < 1e-6);
        assert!(waterfall.cum_label_104 > waterfall.cum_label_78);
        assert!(waterfall.cum_label_total > waterfall.cum_label_104);
    }
}
