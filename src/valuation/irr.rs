//! Internal Rate of Return solvers
//!
//! Both solvers are plain bisections: the NPV of a positive inflow series is
//! strictly decreasing in the rate over the search interval, so fixed bounds
//! and iteration caps keep the results deterministic.

/// Present value of flows at t = 1..n.
pub fn present_value(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(idx, cf)| cf / (1.0 + rate).powi(idx as i32 + 1))
        .sum()
}

/// NPV of an investment at t = 0 followed by flows at t = 1..n.
pub fn npv(initial_cost: f64, flows: &[f64], rate: f64) -> f64 {
    present_value(flows, rate) - initial_cost
}

/// Annual IRR: the rate r where `sum(cf_t / (1+r)^t) = cost`.
///
/// Bisection on [-0.5, 2.0], 100 iterations, tolerance 1e-6. Returns `None`
/// when the cost is non-positive or the flows never repay it (IRR at or
/// below the lower bound).
pub fn annual_irr(cost: f64, flows: &[f64]) -> Option<f64> {
    bisect_irr(cost, flows, -0.50, 2.0)
}

/// Weekly IRR on a weekly inflow series.
///
/// Starts on [-0.01, 0.10] and widens to [-0.01, 0.5] when the upper bound
/// still prices above cost. Multiply by 52 for a rough annual figure.
pub fn weekly_irr(cost: f64, flows: &[f64]) -> Option<f64> {
    if cost <= 0.0 {
        return None;
    }
    let total: f64 = flows.iter().sum();
    if total <= cost {
        return None;
    }

    let mut high = 0.10;
    if npv(cost, flows, high) > 0.0 {
        high = 0.50;
    }
    bisect_irr(cost, flows, -0.01, high)
}

fn bisect_irr(cost: f64, flows: &[f64], mut low: f64, mut high: f64) -> Option<f64> {
    const TOLERANCE: f64 = 1e-6;
    const MAX_ITERATIONS: usize = 100;

    if cost <= 0.0 {
        return None;
    }
    let total: f64 = flows.iter().sum();
    if total <= cost {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let value = npv(cost, flows, mid);

        if value.abs() < TOLERANCE {
            return Some(mid);
        }
        if value > 0.0 {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < TOLERANCE / 100.0 {
            break;
        }
    }

    Some((low + high) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_value_discounts_from_year_one() {
        let flows = vec![110.0];
        assert!((present_value(&flows, 0.10) - 100.0).abs() < 1e-9);

        let flows = vec![0.0, 121.0];
        assert!((present_value(&flows, 0.10) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_simple_annual_irr() {
        // 1000 invested, 1150 back after one year: 15%
        let irr = annual_irr(1000.0, &[1150.0]).unwrap();
        assert!((irr - 0.15).abs() < 1e-4, "got {}", irr);

        // Level flows: 1000 invested, 300/year for 5 years -> ~15.24%
        let irr = annual_irr(1000.0, &[300.0; 5]).unwrap();
        assert!((irr - 0.1524).abs() < 1e-3, "got {}", irr);
    }

    #[test]
    fn test_irr_none_when_flows_cannot_repay() {
        assert!(annual_irr(1000.0, &[100.0; 5]).is_none());
        assert!(annual_irr(0.0, &[100.0; 5]).is_none());
        assert!(annual_irr(-10.0, &[100.0; 5]).is_none());
    }

    #[test]
    fn test_weekly_irr_widens_bounds_for_high_returns() {
        // 100 invested, 30/week for 26 weeks: weekly IRR far above 10%
        let irr = weekly_irr(100.0, &[30.0; 26]).unwrap();
        assert!(irr > 0.10 && irr < 0.50, "got {}", irr);

        // Modest returns stay inside the initial bracket
        let irr = weekly_irr(1000.0, &[25.0; 52]).unwrap();
        assert!(irr > 0.0 && irr < 0.10, "got {}", irr);

        assert!(weekly_irr(1000.0, &[1.0; 52]).is_none());
    }
}
