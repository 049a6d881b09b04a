//! Terminal UI layer for the crime dashboard.
//!
//! Renders a [`dashboard_data::analysis::DashboardSnapshot`] as three tabs
//! (records, monthly trends, map) with [`ratatui`], and as a plain-text
//! report for non-interactive runs.

pub mod app;
pub mod chart_view;
pub mod components;
pub mod map_view;
pub mod report;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
