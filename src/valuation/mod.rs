//! Valuation solvers: IRR, NPV, and deal-cost recommendations

pub mod irr;
pub mod npv;
pub mod solvers;

pub use irr::{annual_irr, npv, present_value, weekly_irr};
pub use npv::{artist_metrics, label_metrics, ArtistMetrics, LabelMetrics};
pub use solvers::{
    max_cost_for_irr, payback_max_cost, recommend_irr, recommend_payback, IrrRecommendation,
    PaybackRecommendation,
};
