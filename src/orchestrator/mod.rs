// Thu Jan 22 2026 - Alex

pub mod batch;
pub mod watchdog;

pub use batch::{BatchState, BatchSummary, FlushGuard, Orchestrator};
pub use watchdog::{BudgetTimer, Watchdog};
