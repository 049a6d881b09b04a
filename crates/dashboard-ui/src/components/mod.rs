//! Small reusable pieces shared by the dashboard tabs.

pub mod header;
