//! # League Stats
//!
//! Leaderboards and rankings for home poker leagues, computed on demand
//! from the game ledger.
//!
//! ## Architecture
//!
//! - **models**: Ledger records, stat types and output shapes
//! - **storage**: JSONL table files backing the ledger
//! - **ledger**: Read-only projection of completed games per player
//! - **calculate**: Decimal helpers and per-stat ranking
//! - **shaper**: Sanitization, rounding and response assembly
//! - **service**: Validation and the request pipeline
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ledger;
pub mod models;
pub mod service;
pub mod shaper;
pub mod storage;

pub use models::*;
