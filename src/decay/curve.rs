//! Normalized 520-week level curve construction
//!
//! Year 1 is built from the calibrated week-over-week rates (L[1] = 1.0);
//! each later year gets a single weekly decay factor d_y solved by bisection
//! so that the year's 52-week sum hits S1 * M[y]. The annual multipliers are
//! targets relative to year 1, never chain-rates to compound.

use crate::error::{EngineError, Result};

/// Weeks per projection year
pub const WEEKS_PER_YEAR: usize = 52;
/// Projection horizon in years
pub const PROJECTION_YEARS: usize = 10;
/// Base curve length in weeks
pub const CURVE_WEEKS: usize = WEEKS_PER_YEAR * PROJECTION_YEARS;

/// Bisection bounds and limits for the per-year decay factor
const FACTOR_LOW: f64 = 1e-4;
const FACTOR_HIGH: f64 = 10.0;
const SOLVE_TOLERANCE: f64 = 1e-12;
const SOLVE_MAX_ITERATIONS: usize = 300;

/// Outcome of a per-year decay factor solve
#[derive(Debug, Clone, Copy)]
pub struct FactorSolve {
    pub factor: f64,
    pub converged: bool,
}

/// Sum of one model year starting one step after `start`:
/// `start * d + start * d^2 + ... + start * d^n`.
fn geometric_year_sum(start: f64, factor: f64, weeks: usize) -> f64 {
    if (factor - 1.0).abs() < 1e-12 {
        return start * weeks as f64;
    }
    start * factor * (1.0 - factor.powi(weeks as i32)) / (1.0 - factor)
}

/// Solve the weekly decay factor d so the 52-week geometric sum from
/// `start` matches `target_sum`.
///
/// The sum is strictly increasing in d, so plain bisection over
/// [1e-4, 10] suffices. A target outside that bracket is a soft failure:
/// the midpoint is returned with `converged = false`.
pub fn solve_year_factor(start: f64, target_sum: f64, weeks: usize) -> Result<FactorSolve> {
    if start <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "year start level must be positive, got {}",
            start
        )));
    }
    if target_sum <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "year target sum must be positive, got {}",
            target_sum
        )));
    }

    let mut low = FACTOR_LOW;
    let mut high = FACTOR_HIGH;

    if geometric_year_sum(start, low, weeks) > target_sum
        || geometric_year_sum(start, high, weeks) < target_sum
    {
        return Ok(FactorSolve {
            factor: (low + high) / 2.0,
            converged: false,
        });
    }

    for _ in 0..SOLVE_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let sum = geometric_year_sum(start, mid, weeks);

        if (sum - target_sum).abs() < SOLVE_TOLERANCE {
            return Ok(FactorSolve {
                factor: mid,
                converged: true,
            });
        }

        if sum < target_sum {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(FactorSolve {
        factor: (low + high) / 2.0,
        converged: true,
    })
}

/// Normalized weekly level curve L[1..n], L[1] = 1.0
#[derive(Debug, Clone)]
pub struct LevelCurve {
    /// L[1..=len] at indices 0..len
    levels: Vec<f64>,
    /// Per-year weekly decay factors; year 1 has none (explicit rates)
    year_factors: [Option<f64>; PROJECTION_YEARS],
    /// Year-1 sum in level units
    s1: f64,
    /// False when any per-year solve fell outside its bracket
    converged: bool,
}

impl LevelCurve {
    /// Build the 520-week curve from year-1 weekly rates and annual
    /// multipliers.
    ///
    /// `weekly_rates` must hold 52 week-over-week multipliers when present;
    /// absent rates fall back to a flat year 1 (the legacy construction).
    /// `multipliers` are normalized annual targets with M[1] = 1.0.
    pub fn build(
        weekly_rates: Option<&[f64]>,
        multipliers: &[f64; PROJECTION_YEARS],
    ) -> Result<Self> {
        for (idx, m) in multipliers.iter().enumerate() {
            if *m <= 0.0 {
                return Err(EngineError::InvalidInput(format!(
                    "annual multiplier for year {} must be positive, got {}",
                    idx + 1,
                    m
                )));
            }
        }

        let mut levels = Vec::with_capacity(CURVE_WEEKS);
        match weekly_rates {
            Some(rates) => {
                if rates.len() != WEEKS_PER_YEAR {
                    return Err(EngineError::InvalidInput(format!(
                        "expected {} weekly rates, got {}",
                        WEEKS_PER_YEAR,
                        rates.len()
                    )));
                }
                levels.push(1.0);
                for t in 2..=WEEKS_PER_YEAR {
                    let rate = rates[t - 2];
                    levels.push(levels[t - 2] * rate);
                }
            }
            None => levels.resize(WEEKS_PER_YEAR, 1.0),
        }

        let s1: f64 = levels.iter().sum();
        let mut year_factors = [None; PROJECTION_YEARS];
        let mut converged = true;

        for year in 2..=PROJECTION_YEARS {
            let target = s1 * multipliers[year - 1];
            let start = levels[levels.len() - 1];
            let solve = solve_year_factor(start, target, WEEKS_PER_YEAR)?;
            if !solve.converged {
                log::warn!(
                    "decay factor for year {} did not bracket its target; using midpoint",
                    year
                );
                converged = false;
            }
            year_factors[year - 1] = Some(solve.factor);

            let mut level = start;
            for _ in 0..WEEKS_PER_YEAR {
                level *= solve.factor;
                levels.push(level);
            }
        }

        Ok(Self {
            levels,
            year_factors,
            s1,
            converged,
        })
    }

    /// Year-1 sum in level units.
    pub fn s1(&self) -> f64 {
        self.s1
    }

    /// Whether every per-year solve converged.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Current curve length in weeks.
    pub fn len_weeks(&self) -> usize {
        self.levels.len()
    }

    /// Year-10 decay factor used for extension beyond week 520.
    pub fn tail_factor(&self) -> f64 {
        self.year_factors[PROJECTION_YEARS - 1].unwrap_or(1.0)
    }

    /// Per-year decay factors (year 1 = None).
    pub fn year_factors(&self) -> &[Option<f64>; PROJECTION_YEARS] {
        &self.year_factors
    }

    /// Level at a 1-indexed model week. Weeks beyond the materialized curve
    /// follow the tail factor.
    pub fn level(&self, week: usize) -> f64 {
        debug_assert!(week >= 1);
        let idx = week - 1;
        if idx < self.levels.len() {
            return self.levels[idx];
        }
        let beyond = (idx - (self.levels.len() - 1)) as i32;
        self.levels[self.levels.len() - 1] * self.tail_factor().powi(beyond)
    }

    /// Materialize the curve out to at least `weeks` entries using the
    /// year-10 tail factor.
    pub fn ensure_len(&mut self, weeks: usize) {
        let tail = self.tail_factor();
        while self.levels.len() < weeks {
            let last = self.levels[self.levels.len() - 1];
            self.levels.push(last * tail);
        }
    }

    /// Sum of `len` levels starting at a 1-indexed week.
    ///
    /// The caller is expected to `ensure_len` first; any residual overhang is
    /// clamped rather than projected.
    pub fn window_sum(&self, start_week: usize, len: usize) -> f64 {
        debug_assert!(start_week >= 1);
        let start = start_week - 1;
        let end = (start + len).min(self.levels.len());
        if start >= end {
            return 0.0;
        }
        self.levels[start..end].iter().sum()
    }

    /// Sum of the 52-week window of `year` (1-indexed) shifted by
    /// `offset_weeks`.
    pub fn year_window_sum(&self, year: usize, offset_weeks: usize) -> f64 {
        let start_week = 1 + (year - 1) * WEEKS_PER_YEAR + offset_weeks;
        self.window_sum(start_week, WEEKS_PER_YEAR)
    }

    /// Largest relative error between per-year sums and their S1 * M[y]
    /// targets.
    pub fn max_calibration_error(&self, multipliers: &[f64; PROJECTION_YEARS]) -> f64 {
        let mut max_error = 0.0_f64;
        for year in 1..=PROJECTION_YEARS {
            let target = self.s1 * multipliers[year - 1];
            if target <= 0.0 {
                continue;
            }
            let actual = self.year_window_sum(year, 0);
            max_error = max_error.max((actual - target).abs() / target);
        }
        max_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_multipliers() -> [f64; PROJECTION_YEARS] {
        [1.0, 0.34, 0.25, 0.20, 0.17, 0.15, 0.135, 0.123, 0.113, 0.105]
    }

    fn sample_rates() -> Vec<f64> {
        // Six-week hold near peak, then steady decay
        let mut rates = vec![1.0; 6];
        rates.extend(std::iter::repeat(0.968).take(WEEKS_PER_YEAR - 6));
        rates
    }

    #[test]
    fn test_solver_matches_flat_and_decaying_targets() {
        // Flat target: 52 weeks at the start level
        let flat = solve_year_factor(1.0, 52.0, WEEKS_PER_YEAR).unwrap();
        assert!(flat.converged);
        assert_relative_eq!(flat.factor, 1.0, epsilon = 1e-6);

        // Known geometric sum: d = 0.97
        let target = geometric_year_sum(2.0, 0.97, WEEKS_PER_YEAR);
        let solve = solve_year_factor(2.0, target, WEEKS_PER_YEAR).unwrap();
        assert!(solve.converged);
        assert_relative_eq!(solve.factor, 0.97, epsilon = 1e-9);
    }

    #[test]
    fn test_solver_flags_unbracketable_target() {
        // Target below what even d = 1e-4 produces
        let solve = solve_year_factor(1.0, 1e-9, WEEKS_PER_YEAR).unwrap();
        assert!(!solve.converged);

        assert!(solve_year_factor(0.0, 10.0, WEEKS_PER_YEAR).is_err());
        assert!(solve_year_factor(1.0, -1.0, WEEKS_PER_YEAR).is_err());
    }

    #[test]
    fn test_curve_year_sums_match_calibration() {
        let multipliers = sample_multipliers();
        let rates = sample_rates();
        let curve = LevelCurve::build(Some(&rates), &multipliers).unwrap();

        assert!(curve.converged());
        assert_eq!(curve.len_weeks(), CURVE_WEEKS);
        assert_relative_eq!(curve.level(1), 1.0);

        // Per-year sums equal S1 * M[y] within 1e-4 relative
        for year in 1..=PROJECTION_YEARS {
            let target = curve.s1() * multipliers[year - 1];
            let actual = curve.year_window_sum(year, 0);
            assert!(
                (actual - target).abs() / target < 1e-4,
                "year {}: sum {} target {}",
                year,
                actual,
                target
            );
        }
        assert!(curve.max_calibration_error(&multipliers) < 1e-4);
    }

    #[test]
    fn test_curve_is_continuous_across_year_boundaries() {
        let multipliers = sample_multipliers();
        let rates = sample_rates();
        let curve = LevelCurve::build(Some(&rates), &multipliers).unwrap();

        for year in 2..=PROJECTION_YEARS {
            let d = curve.year_factors()[year - 1].unwrap();
            let boundary = (year - 1) * WEEKS_PER_YEAR;
            // First week of the year is the previous year's end times d
            assert_relative_eq!(
                curve.level(boundary + 1),
                curve.level(boundary) * d,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_flat_fallback_without_weekly_rates() {
        let multipliers = sample_multipliers();
        let curve = LevelCurve::build(None, &multipliers).unwrap();

        assert_relative_eq!(curve.s1(), WEEKS_PER_YEAR as f64);
        for week in 1..=WEEKS_PER_YEAR {
            assert_relative_eq!(curve.level(week), 1.0);
        }
        // Later years still hit their targets
        for year in 2..=PROJECTION_YEARS {
            let target = curve.s1() * multipliers[year - 1];
            let actual = curve.year_window_sum(year, 0);
            assert!((actual - target).abs() / target < 1e-4);
        }
    }

    #[test]
    fn test_extension_follows_tail_factor() {
        let multipliers = sample_multipliers();
        let rates = sample_rates();
        let mut curve = LevelCurve::build(Some(&rates), &multipliers).unwrap();
        let tail = curve.tail_factor();
        let last = curve.level(CURVE_WEEKS);

        curve.ensure_len(CURVE_WEEKS + 30);
        assert_eq!(curve.len_weeks(), CURVE_WEEKS + 30);
        assert_relative_eq!(curve.level(CURVE_WEEKS + 1), last * tail, epsilon = 1e-12);
        assert_relative_eq!(
            curve.level(CURVE_WEEKS + 30),
            last * tail.powi(30),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rejects_malformed_inputs() {
        let mut multipliers = sample_multipliers();
        let rates = sample_rates();

        assert!(LevelCurve::build(Some(&rates[..10]), &multipliers).is_err());

        multipliers[3] = 0.0;
        assert!(LevelCurve::build(Some(&rates), &multipliers).is_err());
    }
}
