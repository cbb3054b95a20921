//! Core types for booking statistics.
//!
//! Holds the record model, the fixed weekday/category label sets, the
//! multi-strategy timestamp parser, the shared error type and CLI settings.

pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, StatsError};
