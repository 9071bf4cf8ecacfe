//! Deal cash-flow models at annual and weekly granularity

pub mod engine;
pub mod weekly;

pub use engine::{
    artist_payouts, label_inflows, recoupable_amount, CashFlowEngine, YearlyCashFlow,
};
pub use weekly::{
    annualize, payback_week, simulate_waterfall, weekly_gross_series, WeeklyWaterfall,
};
