//! Deal valuation metrics for the label and artist sides
//!
//! The label series is modeled as a year-0 investment outflow followed by
//! ten annual inflows; the artist series as a year-0 advance inflow followed
//! by ten royalty payouts.

use super::irr::{annual_irr, present_value};
use serde::{Deserialize, Serialize};

/// Label-side valuation of a deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMetrics {
    /// Upfront investment (advance + marketing + recording)
    pub investment: f64,
    /// NPV of (-investment, inflows...) at the discount rate
    pub npv: f64,
    /// IRR of the investment series, when one exists
    pub irr: Option<f64>,
    /// Multiple on invested capital: positive inflows / investment
    pub moic: Option<f64>,
    /// First year where cumulative label cash turns non-negative
    pub payback_year: Option<u32>,
    /// Payback timing interpolated within the payback year
    pub payback_period: Option<f64>,
    /// Undiscounted sum of label inflows
    pub total_label_in: f64,
}

/// Artist-side valuation of a deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistMetrics {
    /// Advance received at year 0
    pub advance: f64,
    /// NPV of the royalty payouts alone (years 1..10)
    pub npv_royalties: f64,
    /// Undiscounted royalty payouts
    pub total_royalties: f64,
    /// NPV including the year-0 advance
    pub npv_incl_advance: f64,
    /// Undiscounted cash including the advance
    pub total_cash_incl_advance: f64,
    /// First year with positive cumulative royalties (royalties-only view)
    pub breakeven_year: Option<u32>,
}

/// Compute label metrics from annual inflows and the upfront investment.
pub fn label_metrics(label_inflows: &[f64], investment: f64, discount_rate: f64) -> LabelMetrics {
    let npv = present_value(label_inflows, discount_rate) - investment;
    let total_label_in: f64 = label_inflows.iter().sum();

    let irr = annual_irr(investment, label_inflows);

    let moic = if investment > 0.0 {
        Some(label_inflows.iter().filter(|cf| **cf > 0.0).sum::<f64>() / investment)
    } else {
        None
    };

    let mut payback_year = None;
    let mut payback_period = None;
    let mut cumulative = -investment;
    for (idx, cf) in label_inflows.iter().enumerate() {
        let before = cumulative;
        cumulative += cf;
        if payback_year.is_none() && cumulative >= 0.0 {
            let year = idx as u32 + 1;
            payback_year = Some(year);
            // Fraction of the year needed to close the residual
            payback_period = Some(if *cf > 0.0 {
                idx as f64 + (-before / cf)
            } else {
                year as f64
            });
            break;
        }
    }

    LabelMetrics {
        investment,
        npv,
        irr,
        moic,
        payback_year,
        payback_period,
        total_label_in,
    }
}

/// Compute artist metrics from annual payouts and the year-0 advance.
pub fn artist_metrics(artist_payouts: &[f64], advance: f64, discount_rate: f64) -> ArtistMetrics {
    let npv_royalties = present_value(artist_payouts, discount_rate);
    let total_royalties: f64 = artist_payouts.iter().sum();

    let mut breakeven_year = None;
    let mut cumulative = 0.0;
    for (idx, cf) in artist_payouts.iter().enumerate() {
        cumulative += cf;
        if cumulative > 0.0 {
            breakeven_year = Some(idx as u32 + 1);
            break;
        }
    }

    ArtistMetrics {
        advance,
        npv_royalties,
        total_royalties,
        // The advance lands at t = 0, undiscounted
        npv_incl_advance: advance + npv_royalties,
        total_cash_incl_advance: advance + total_royalties,
        breakeven_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_metrics_basic() {
        let inflows = vec![500.0, 400.0, 300.0, 200.0, 100.0];
        let metrics = label_metrics(&inflows, 1000.0, 0.10);

        assert!((metrics.total_label_in - 1500.0).abs() < 1e-9);
        assert!((metrics.moic.unwrap() - 1.5).abs() < 1e-9);
        // Cumulative: -1000, -500, -100, +200 -> payback in year 3
        assert_eq!(metrics.payback_year, Some(3));
        // Year 3 needs 100 of its 300: period = 2 + 1/3
        assert!((metrics.payback_period.unwrap() - (2.0 + 100.0 / 300.0)).abs() < 1e-9);
        assert!(metrics.irr.is_some());
        assert!(metrics.npv > 0.0);
    }

    #[test]
    fn test_label_metrics_never_pays_back() {
        let inflows = vec![100.0; 10];
        let metrics = label_metrics(&inflows, 5000.0, 0.10);

        assert_eq!(metrics.payback_year, None);
        assert_eq!(metrics.payback_period, None);
        assert!(metrics.irr.is_none());
        assert!(metrics.npv < 0.0);
        assert!((metrics.moic.unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_artist_metrics_with_withheld_years() {
        // Two years of full withholding, then payouts
        let payouts = vec![0.0, 0.0, 300.0, 250.0, 200.0];
        let metrics = artist_metrics(&payouts, 400.0, 0.10);

        assert_eq!(metrics.breakeven_year, Some(3));
        assert!((metrics.total_royalties - 750.0).abs() < 1e-9);
        assert!((metrics.total_cash_incl_advance - 1150.0).abs() < 1e-9);
        assert!((metrics.npv_incl_advance - (400.0 + metrics.npv_royalties)).abs() < 1e-9);
        assert!(metrics.npv_royalties < metrics.total_royalties);
    }

    #[test]
    fn test_artist_metrics_zero_payouts() {
        let metrics = artist_metrics(&[0.0; 10], 250.0, 0.10);
        assert_eq!(metrics.breakeven_year, None);
        assert_eq!(metrics.npv_royalties, 0.0);
        assert!((metrics.total_cash_incl_advance - 250.0).abs() < 1e-9);
    }
}
