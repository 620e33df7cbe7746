// Numicell slotframe scheduling-function simulator public surface.
// Numan Thabit 2026

pub mod config;

pub mod filter;

pub mod frame;

pub mod traffic;

pub mod sf;

pub mod engine;

pub mod report;

pub use config::{
    Config, ConfigError, DeltaQParams, DualBudgetParams, EwmaParams, EwmmParams, MsfParams,
    RunParams, TxqBudgetParams,
};

pub use filter::{ewma, ewmm, ewmm2};

pub use frame::{CellRequest, Slotframe, MAX_CELLS, MIN_CELLS};

pub use traffic::{Pattern, TrafficSource};

pub use sf::{
    delta_q::DeltaQ, dual_budget::DualBudget, ewma::EwmaDeltaQ, ewmm::EwmmDeltaQ, fixed::Fixed,
    msf::MsfLegacy, txq_budget::TxqBudget, Record, SchedulingFunction, Value, DECISION_KEY,
};

pub use engine::{EngineError, RunStats, Simulation, Totals, MAX_TXQ, WARMUP_ITER};

pub use report::{ColumnReport, NullReport, RawReport, Reporter, SIM_COLUMNS};
