use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Dashboard header, three lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Filter state in `[ window | crime | N records ]` format.
pub struct Header<'a> {
    /// Date window, already formatted (e.g. `"2014-01-01 → 2015-01-01"`).
    pub window: String,
    /// Highlighted crime description.
    pub highlighted: &'a str,
    /// Records inside the window.
    pub record_count: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        window: impl Into<String>,
        highlighted: &'a str,
        record_count: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            window: window.into(),
            highlighted,
            record_count,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(Span::styled(" BALTIMORE CRIME DASHBOARD ", self.theme.header)),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.window.clone(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.highlighted, self.theme.error),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!(
                        "{} records",
                        dashboard_core::formatting::format_count(self.record_count as u64)
                    ),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
