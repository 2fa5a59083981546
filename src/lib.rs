//! # Peloton Pool
//!
//! A fantasy cycling pool tracker: participants draft riders, stage results
//! award points, and the pool is ranked after every stage.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (riders, participants, stage results, snapshots)
//! - **validate**: Roster and payload checks that report every issue at once
//! - **calculate**: Stage application, totals, daily wins and ranking history
//! - **tracker**: Owning facade that recomputes derived views after every write
//! - **ingest**: Reading roster and stage files from disk
//! - **storage**: Filesystem persistence (JSON snapshots, JSONL stage log)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;
pub mod tracker;
pub mod validate;

pub use models::*;
pub use tracker::Tracker;
pub use validate::{Issue, ValidationErrors};
