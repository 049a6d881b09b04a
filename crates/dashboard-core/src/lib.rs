//! Shared types and rules for the crime dashboard.
//!
//! Holds the incident models, the per-column normalisers used by the
//! cleaning pipeline, timestamp and month helpers, display formatting,
//! CLI settings and the crate-wide error type.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
