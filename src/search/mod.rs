//! Search orchestration module
//!
//! The aggregator merges the two providers into canonical records; the
//! orchestrator owns the debounced search state machine and its history.

mod aggregator;
mod history;
mod orchestrator;

pub use aggregator::MovieAggregator;
pub use history::{HistoryStore, SearchHistoryEntry};
pub use orchestrator::{SearchOrchestrator, SearchSnapshot};
