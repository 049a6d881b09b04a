//! Plain-text rendering of a snapshot for non-interactive use.

use std::fmt::Write;

use dashboard_core::formatting::{format_count, format_percent, truncate_to_width};
use dashboard_core::models::TrackedCategory;
use dashboard_data::analysis::DashboardSnapshot;

/// Number of descriptions listed in the "top descriptions" section.
pub const TOP_DESCRIPTIONS: usize = 10;

const PERCENT_WIDTH: usize = 8;

/// Render `snapshot` as a multi-section text report.
pub fn render_report(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let separator = "=".repeat(60);

    // `fmt::Write` for `String` never fails.
    let _ = writeln!(out, "CRIME DASHBOARD REPORT");
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "Window:      {}", snapshot.query.window);
    let _ = writeln!(
        out,
        "Records:     {} of {}",
        format_count(snapshot.metadata.records_in_window as u64),
        format_count(snapshot.metadata.records_total as u64)
    );
    let _ = writeln!(
        out,
        "Highlighted: {} ({})",
        snapshot.query.highlighted,
        format_count(snapshot.highlighted_count() as u64)
    );
    if let Some((lat, lon)) = snapshot.map_center {
        let _ = writeln!(out, "Map centre:  {lat:.5}, {lon:.5}");
    }
    let _ = writeln!(out);

    if snapshot.is_empty() {
        let _ = writeln!(out, "No incidents in this date window.");
        return out;
    }

    let _ = writeln!(out, "Top descriptions");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for (desc, n) in snapshot.description_counts.iter().take(TOP_DESCRIPTIONS) {
        let _ = writeln!(out, "{:<30} {:>10}", truncate_to_width(desc, 30), format_count(*n));
    }
    let _ = writeln!(out);

    let mut categories = TrackedCategory::all();
    categories.sort_by_key(|c| c.rank());

    let _ = writeln!(out, "Monthly share of incidents (%)");
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = write!(out, "{:<8} {:>7}", "Month", "Total");
    for c in &categories {
        let _ = write!(out, " {:>PERCENT_WIDTH$}", format!("#{}", c.rank()));
    }
    let _ = writeln!(out);
    for row in &snapshot.composition {
        let _ = write!(out, "{:<8} {:>7}", row.month, format_count(row.total));
        for c in &categories {
            let _ = write!(out, " {:>PERCENT_WIDTH$}", format_percent(row.percent(*c), 1));
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Legend");
    for c in &categories {
        let _ = writeln!(out, "  #{:<3} {}", c.rank(), c.legend());
    }

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
