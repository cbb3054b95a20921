//! Data layer for booking statistics.
//!
//! Responsible for loading booking records from JSON / JSONL exports,
//! folding them into statistics snapshots and memoizing the result.

pub mod aggregator;
pub mod cache;
pub mod reader;

pub use booking_core as core;
