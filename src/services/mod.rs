pub mod reconcile;
pub mod scout;

pub use reconcile::{ItemResult, Outcome, ReconcileStats, ShowReport, classify, reconcile_items};
pub use scout::{RunSummary, ShowError, ShowFailure, ShowScout};
