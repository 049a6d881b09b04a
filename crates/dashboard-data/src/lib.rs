//! Data layer for the crime dashboard.
//!
//! Reads the raw incident CSV, cleans it into a read-only record set, and
//! derives the monthly tables and map data shown by the presentation layer.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod export;
pub mod reader;

pub use dashboard_core as core;
