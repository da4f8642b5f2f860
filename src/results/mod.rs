//! Canonical result entities
//!
//! The provider-agnostic `Movie` record and its companions, produced by
//! the aggregation layer and consumed by presentation collaborators.

mod types;

pub use types::*;
