//! Map tab: incident locations on a braille canvas.

use ratatui::{
    layout::Rect,
    symbols,
    text::{Line, Span},
    widgets::canvas::{Canvas, Points},
    widgets::{Block, Borders},
    Frame,
};

use dashboard_data::analysis::MapPoint;

use crate::themes::Theme;

/// Fraction of the data span added on each side of the canvas.
const PADDING: f64 = 0.05;

/// Smallest span used on either axis, in degrees.
const MIN_SPAN: f64 = 0.01;

/// Canvas bounds `(x = longitude, y = latitude)` around `points`.
pub fn map_bounds(points: &[MapPoint]) -> Option<([f64; 2], [f64; 2])> {
    let first = points.first()?;
    let mut lon = [first.longitude, first.longitude];
    let mut lat = [first.latitude, first.latitude];
    for p in points {
        lon = [lon[0].min(p.longitude), lon[1].max(p.longitude)];
        lat = [lat[0].min(p.latitude), lat[1].max(p.latitude)];
    }
    Some((pad(lon), pad(lat)))
}

fn pad([lo, hi]: [f64; 2]) -> [f64; 2] {
    let span = (hi - lo).max(MIN_SPAN);
    let mid = (lo + hi) / 2.0;
    let half = span * (0.5 + PADDING);
    [mid - half, mid + half]
}

/// Split points into `(others, highlighted)` canvas coordinates.
pub fn split_points(points: &[MapPoint]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let mut others = Vec::new();
    let mut highlighted = Vec::new();
    for p in points {
        let xy = (p.longitude, p.latitude);
        if p.highlighted {
            highlighted.push(xy);
        } else {
            others.push(xy);
        }
    }
    (others, highlighted)
}

/// Draw the map. Highlighted incidents are painted on a second layer so they
/// stay visible over dense clusters of other points.
pub fn render_map(
    frame: &mut Frame,
    area: Rect,
    points: &[MapPoint],
    center: Option<(f64, f64)>,
    highlighted: &str,
    theme: &Theme,
) {
    let Some((x_bounds, y_bounds)) = map_bounds(points) else {
        crate::table_view::render_no_data(frame, area, theme);
        return;
    };
    let (others, marked) = split_points(points);

    let title = Line::from(vec![
        Span::styled(" Map: ", theme.header),
        Span::styled(highlighted.to_string(), theme.error),
        Span::styled(format!(" ({}) vs other ({}) ", marked.len(), others.len()), theme.label),
    ]);

    let other_color = theme.map_color(false);
    let marked_color = theme.map_color(true);
    let center_style = theme.value;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &others,
                color: other_color,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &marked,
                color: marked_color,
            });
            if let Some((lat, lon)) = center {
                ctx.print(lon, lat, Span::styled("+", center_style));
            }
        });

    frame.render_widget(canvas, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn point(lat: f64, lon: f64, highlighted: bool) -> MapPoint {
        MapPoint {
            latitude: lat,
            longitude: lon,
            description: if highlighted { "ARSON" } else { "LARCENY" }.to_string(),
            highlighted,
        }
    }

    #[test]
    fn test_map_bounds_empty() {
        assert!(map_bounds(&[]).is_none());
    }

    #[test]
    fn test_map_bounds_contain_all_points() {
        let pts = vec![
            point(39.20, -76.70, false),
            point(39.35, -76.52, true),
            point(39.30, -76.60, false),
        ];
        let (x, y) = map_bounds(&pts).unwrap();
        for p in &pts {
            assert!(x[0] < p.longitude && p.longitude < x[1]);
            assert!(y[0] < p.latitude && p.latitude < y[1]);
        }
    }

    #[test]
    fn test_map_bounds_single_point_has_span() {
        let (x, y) = map_bounds(&[point(39.3, -76.6, false)]).unwrap();
        assert!(x[1] - x[0] >= MIN_SPAN);
        assert!(y[1] - y[0] >= MIN_SPAN);
    }

    #[test]
    fn test_split_points_by_highlight() {
        let pts = vec![
            point(39.2, -76.7, false),
            point(39.3, -76.6, true),
            point(39.4, -76.5, false),
        ];
        let (others, marked) = split_points(&pts);
        assert_eq!(others, vec![(-76.7, 39.2), (-76.5, 39.4)]);
        assert_eq!(marked, vec![(-76.6, 39.3)]);
    }

    #[test]
    fn test_render_map_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let theme = Theme::dark();
        let pts = vec![point(39.2, -76.7, false), point(39.3, -76.6, true)];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_map(frame, area, &pts, Some((39.25, -76.65)), "ARSON", &theme);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("ARSON"));
    }

    #[test]
    fn test_render_map_empty_shows_placeholder() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_map(frame, area, &[], None, "ARSON", &theme);
            })
            .unwrap();
    }
}
