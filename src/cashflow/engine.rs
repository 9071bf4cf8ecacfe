//! Annual cash-flow engine for the three deal structures
//!
//! Turns (year-1 gross, annual multipliers, deal terms) into ten rows of
//! (gross, label inflow, artist payout). The three structures differ only in
//! how the deal cost interacts with the revenue stream:
//!
//! - Royalty: fixed split forever; the advance is a year-0 outflow that is
//!   never recovered from this stream.
//! - Funded Distribution: the label takes 100% of gross until the recoupable
//!   amount is back, then reverts to its post-recoup share. Cost shifts
//!   timing, not lifetime value.
//! - Profit Split: the cost is expensed against gross before the split, so
//!   value is permanently reduced.

use crate::deal::DealType;
use crate::decay::PROJECTION_YEARS;
use serde::{Deserialize, Serialize};

/// One projected year of the deal waterfall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyCashFlow {
    pub year: u32,
    /// Annual multiplier relative to year 1
    pub multiplier: f64,
    /// Gross revenue for the year
    pub gross: f64,
    /// Label cash inflow after the deal-type waterfall
    pub label_in: f64,
    /// Artist payout after the deal-type waterfall
    pub artist_out: f64,
    /// Label inflow discounted at the display rate
    pub discounted_label_in: f64,
}

/// The recoupable portion of a deal cost: the advance, plus marketing when
/// the deal makes marketing recoupable.
pub fn recoupable_amount(total_cost: f64, advance_share: f64, marketing_recoupable: bool) -> f64 {
    if marketing_recoupable {
        total_cost
    } else {
        total_cost * advance_share
    }
}

/// Annual cash-flow engine for one deal
#[derive(Debug, Clone)]
pub struct CashFlowEngine {
    year1_gross: f64,
    multipliers: [f64; PROJECTION_YEARS],
    label_share: f64,
    deal_type: DealType,
    display_rate: f64,
}

impl CashFlowEngine {
    /// Create an engine from the projection basis and deal terms.
    ///
    /// `label_share` is the label's base share of gross (already resolved
    /// from the deal percent by deal type).
    pub fn new(
        year1_gross: f64,
        multipliers: [f64; PROJECTION_YEARS],
        label_share: f64,
        deal_type: DealType,
        display_rate: f64,
    ) -> Self {
        Self {
            year1_gross,
            multipliers,
            label_share,
            deal_type,
            display_rate,
        }
    }

    /// Gross revenue per year: `year1_gross * M[y]`. The multipliers are
    /// cumulative relative to year 1, never compounded.
    pub fn yearly_gross(&self) -> [f64; PROJECTION_YEARS] {
        let mut gross = [0.0; PROJECTION_YEARS];
        for (slot, m) in gross.iter_mut().zip(self.multipliers.iter()) {
            *slot = self.year1_gross * m;
        }
        gross
    }

    /// Total gross over the ten-year horizon.
    pub fn total_gross(&self) -> f64 {
        self.yearly_gross().iter().sum()
    }

    fn row(&self, year: usize, gross: f64, label_in: f64, artist_out: f64) -> YearlyCashFlow {
        YearlyCashFlow {
            year: year as u32,
            multiplier: self.multipliers[year - 1],
            gross,
            label_in,
            artist_out,
            discounted_label_in: label_in / (1.0 + self.display_rate).powi(year as i32),
        }
    }

    /// Steady-state split with no recoupment effects.
    ///
    /// For royalty deals this is the true cash flow; for distribution it is
    /// the post-recoup state; for profit split the pre-expense state.
    pub fn base_flows(&self) -> Vec<YearlyCashFlow> {
        self.yearly_gross()
            .iter()
            .enumerate()
            .map(|(idx, gross)| {
                self.row(
                    idx + 1,
                    *gross,
                    gross * self.label_share,
                    gross * (1.0 - self.label_share),
                )
            })
            .collect()
    }

    /// Deal-type waterfall against a recoupment / expense base.
    ///
    /// `recoup_amount` is the distribution recoupable or the profit-split
    /// expense pool; royalty flows ignore it.
    pub fn flows_with_recoup(&self, recoup_amount: f64) -> Vec<YearlyCashFlow> {
        match self.deal_type {
            DealType::Royalty => self.base_flows(),
            DealType::Distribution => self.distribution_flows(recoup_amount),
            DealType::ProfitSplit => self.profit_split_flows(recoup_amount),
        }
    }

    /// Waterfall for the full deal terms: resolves the recoupment base from
    /// the cost split per deal type, then delegates to `flows_with_recoup`.
    ///
    /// Profit-split expenses are always the full cost; distribution recoups
    /// the advance (plus marketing when recoupable); royalty ignores cost.
    pub fn flows_for_deal(
        &self,
        total_cost: f64,
        advance_share: f64,
        marketing_recoupable: bool,
    ) -> Vec<YearlyCashFlow> {
        let base = match self.deal_type {
            DealType::Royalty => 0.0,
            DealType::ProfitSplit => total_cost,
            DealType::Distribution => {
                recoupable_amount(total_cost, advance_share, marketing_recoupable)
            }
        };
        self.flows_with_recoup(base)
    }

    /// Funded distribution: the label keeps recoup dollars off the top of
    /// each year's gross and the residual reverts to the normal split within
    /// the same year.
    fn distribution_flows(&self, recoup_amount: f64) -> Vec<YearlyCashFlow> {
        let mut residual = recoup_amount.max(0.0);
        self.yearly_gross()
            .iter()
            .enumerate()
            .map(|(idx, gross)| {
                let recouped = gross.min(residual);
                let post_recoup = (gross - residual).max(0.0);
                residual -= recouped;

                self.row(
                    idx + 1,
                    *gross,
                    recouped + post_recoup * self.label_share,
                    post_recoup * (1.0 - self.label_share),
                )
            })
            .collect()
    }

    /// Profit split: expenses allocate across years proportionally to gross
    /// and net profit floors at zero before the split.
    fn profit_split_flows(&self, expense_pool: f64) -> Vec<YearlyCashFlow> {
        let gross = self.yearly_gross();
        let total_gross: f64 = gross.iter().sum();

        gross
            .iter()
            .enumerate()
            .map(|(idx, gross)| {
                let expense = if total_gross > 0.0 {
                    expense_pool * gross / total_gross
                } else {
                    0.0
                };
                let net = (gross - expense).max(0.0);

                self.row(
                    idx + 1,
                    *gross,
                    net * self.label_share,
                    net * (1.0 - self.label_share),
                )
            })
            .collect()
    }
}

/// Label inflow column of a flow series.
pub fn label_inflows(flows: &[YearlyCashFlow]) -> Vec<f64> {
    flows.iter().map(|f| f.label_in).collect()
}

/// Artist payout column of a flow series.
pub fn artist_payouts(flows: &[YearlyCashFlow]) -> Vec<f64> {
    flows.iter().map(|f| f.artist_out).collect()
}
