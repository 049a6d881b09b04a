//! Records tab and composition table for the crime dashboard.
//!
//! The records tab shows the incidents of the current window in a bordered
//! [`ratatui::widgets::Table`] next to a horizontal bar chart of incident
//! counts per description.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{format_count, format_percent, truncate_to_width};
use dashboard_core::models::{CleanedIncident, TrackedCategory};
use dashboard_data::aggregator::MonthlyComposition;

use crate::themes::Theme;

const RECORD_HEADERS: [&str; 9] = [
    "Date/Time",
    "Description",
    "Weapon",
    "Gender",
    "Age",
    "Race",
    "Premise",
    "Latitude",
    "Longitude",
];

/// Render one page of `records` starting at `offset`, with a footer row
/// carrying the record count.
pub fn render_records_table(
    frame: &mut Frame,
    area: Rect,
    records: &[CleanedIncident],
    offset: usize,
    theme: &Theme,
) {
    let header = Row::new(
        RECORD_HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    // Border (2) + header (1) + footer (1).
    let visible = usize::from(area.height.saturating_sub(4));
    let start = offset.min(records.len());

    let mut rows: Vec<Row> = records
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(r.crime_date_time.clone().unwrap_or_default()),
                Cell::from(truncate_to_width(&r.description, 20)),
                Cell::from(truncate_to_width(&r.weapon, 12)),
                Cell::from(r.gender.to_string()),
                Cell::from(r.age.to_string()),
                Cell::from(truncate_to_width(&r.race, 14)),
                Cell::from(truncate_to_width(&r.premise_type, 16)),
                Cell::from(format!("{:.5}", r.latitude)),
                Cell::from(format!("{:.5}", r.longitude)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let shown_to = (start + rows.len()).min(records.len());
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL").style(theme.table_total),
            Cell::from(format!("{} records", format_count(records.len() as u64))),
            Cell::from(if records.is_empty() {
                String::new()
            } else {
                format!("rows {}-{}", start + 1, shown_to)
            }),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(23),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Incidents "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Horizontal bar chart of incidents per description.
pub fn render_description_bars(
    frame: &mut Frame,
    area: Rect,
    counts: &[(String, u64)],
    theme: &Theme,
) {
    let bars: Vec<Bar> = counts
        .iter()
        .map(|(desc, n)| {
            Bar::default()
                .value(*n)
                .text_value(format_count(*n))
                .label(Line::from(truncate_to_width(desc, 16)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Incidents by description "),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .bar_style(theme.bar)
        .value_style(theme.bar_value)
        .label_style(theme.label);

    frame.render_widget(chart, area);
}

/// Records tab: table on the left, description bars on the right.
pub fn render_records_tab(
    frame: &mut Frame,
    area: Rect,
    records: &[CleanedIncident],
    counts: &[(String, u64)],
    offset: usize,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);
    render_records_table(frame, chunks[0], records, offset, theme);
    render_description_bars(frame, chunks[1], counts, theme);
}

/// Monthly composition as a table: one row per month, one column per tracked
/// category (headed by legend rank), plus the month total.
pub fn render_composition_table(
    frame: &mut Frame,
    area: Rect,
    composition: &[MonthlyComposition],
    theme: &Theme,
) {
    let mut categories = TrackedCategory::all();
    categories.sort_by_key(|c| c.rank());

    let mut header_cells = vec![
        Cell::from("Month").style(theme.table_header),
        Cell::from("Total").style(theme.table_header),
    ];
    header_cells.extend(
        categories
            .iter()
            .map(|c| Cell::from(truncate_to_width(&c.legend(), 9)).style(theme.table_header)),
    );
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = composition
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![
                Cell::from(row.month.clone()),
                Cell::from(format_count(row.total)),
            ];
            cells.extend(
                categories
                    .iter()
                    .map(|c| Cell::from(format_percent(row.percent(*c), 1))),
            );
            Row::new(cells).style(theme.row_style(i))
        })
        .collect();

    let mut widths = vec![Constraint::Length(8), Constraint::Length(7)];
    widths.extend(categories.iter().map(|_| Constraint::Length(9)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Monthly share of incidents "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when the window holds no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No incidents in this date window", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Use ] and [ to move the window by a month.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Crime Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
