//! Core data models for league stats.

mod ledger;
mod stats;

pub use ledger::*;
pub use stats::*;
