//! Deal structures, per-request inputs, and engine configuration

mod data;

pub use data::{
    DealInputs, DealType, DecayMode, EngineConfig, ExpenseAllocation, MarketMix, RowMode,
    TrackState,
};
