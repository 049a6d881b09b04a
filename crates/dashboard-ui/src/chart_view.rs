//! Trends tab: monthly incident totals and the per-category share of each
//! month, drawn as line charts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
    Frame,
};

use dashboard_core::formatting::format_count;
use dashboard_core::models::TrackedCategory;
use dashboard_data::aggregator::{MonthlyComposition, MonthlyTotal};

use crate::table_view;
use crate::themes::Theme;

/// `(index, count)` points for the totals line.
pub fn totals_points(totals: &[MonthlyTotal]) -> Vec<(f64, f64)> {
    totals
        .iter()
        .enumerate()
        .map(|(i, t)| (i as f64, t.count as f64))
        .collect()
}

/// `(index, percent)` points for one category. Months with an undefined
/// percentage leave a gap rather than a zero.
pub fn category_points(
    composition: &[MonthlyComposition],
    category: TrackedCategory,
) -> Vec<(f64, f64)> {
    composition
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.percent(category).map(|p| (i as f64, p)))
        .collect()
}

/// First, middle and last month labels for the x axis.
fn month_labels(months: &[&str]) -> Vec<String> {
    match months.len() {
        0 => Vec::new(),
        1 => vec![months[0].to_string()],
        2 => vec![months[0].to_string(), months[1].to_string()],
        n => vec![
            months[0].to_string(),
            months[n / 2].to_string(),
            months[n - 1].to_string(),
        ],
    }
}

fn x_bounds(len: usize) -> [f64; 2] {
    [0.0, len.saturating_sub(1).max(1) as f64]
}

/// Line chart of incidents per month.
pub fn render_totals_chart(frame: &mut Frame, area: Rect, totals: &[MonthlyTotal], theme: &Theme) {
    let points = totals_points(totals);
    let peak = totals.iter().map(|t| t.count).max().unwrap_or(0);
    let months: Vec<&str> = totals.iter().map(|t| t.month.as_str()).collect();

    let dataset = Dataset::default()
        .name("Incidents")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.line_total)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Incidents per month "),
        )
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds(x_bounds(totals.len()))
                .labels(month_labels(&months)),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, (peak.max(1)) as f64])
                .labels(vec!["0".to_string(), format_count(peak)]),
        )
        .legend_position(None);

    frame.render_widget(chart, area);
}

/// One line per tracked category, in legend order, on a 0-100 % scale.
pub fn render_composition_chart(
    frame: &mut Frame,
    area: Rect,
    composition: &[MonthlyComposition],
    theme: &Theme,
) {
    let mut categories = TrackedCategory::all();
    categories.sort_by_key(|c| c.rank());

    let series: Vec<(TrackedCategory, Vec<(f64, f64)>)> = categories
        .into_iter()
        .map(|c| (c, category_points(composition, c)))
        .collect();
    let peak = series
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|(_, y)| *y))
        .fold(0.0_f64, f64::max);
    let y_max = if peak > 0.0 { peak.min(100.0) } else { 100.0 };
    let months: Vec<&str> = composition.iter().map(|r| r.month.as_str()).collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(c, pts)| {
            Dataset::default()
                .name(c.legend())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.category_color(*c))
                .data(pts)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Share of monthly incidents (%) "),
        )
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds(x_bounds(composition.len()))
                .labels(month_labels(&months)),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(vec!["0".to_string(), format!("{y_max:.0}")]),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(80)));

    frame.render_widget(chart, area);
}

/// Trends tab: totals chart, composition chart and composition table.
pub fn render_trends_tab(
    frame: &mut Frame,
    area: Rect,
    totals: &[MonthlyTotal],
    composition: &[MonthlyComposition],
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);
    render_totals_chart(frame, rows[0], totals, theme);
    render_composition_chart(frame, rows[1], composition, theme);
    table_view::render_composition_table(frame, rows[2], composition, theme);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
