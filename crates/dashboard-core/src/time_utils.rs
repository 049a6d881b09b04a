use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses the `CrimeDateTime` strings found in the incident table.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to parse `s` into a naive UTC date-time.
    ///
    /// Handles:
    /// * the source's own `2014/01/01 00:00:00+00` form (offset with or
    ///   without minutes),
    /// * RFC 3339 / ISO 8601, including the `Z` suffix,
    /// * offset-free date-time patterns with `-` or `/` separators,
    /// * plain dates, taken as midnight.
    ///
    /// Offset-bearing values are converted to UTC; offset-free ones are taken
    /// as already being UTC.
    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.naive_utc());
        }

        const OFFSET_FORMATS: &[&str] = &[
            "%Y/%m/%d %H:%M:%S%#z",
            "%Y-%m-%d %H:%M:%S%#z",
            "%Y-%m-%dT%H:%M:%S%#z",
            "%Y/%m/%d %H:%M:%S%.f%#z",
            "%Y-%m-%d %H:%M:%S%.f%#z",
        ];
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalised, fmt) {
                return Some(dt.naive_utc());
            }
        }

        const NAIVE_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y/%m/%d %H:%M:%S",
            "%m/%d/%Y %H:%M:%S",
            "%m/%d/%Y %I:%M:%S %p",
        ];
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        }

        debug!("TimestampProcessor: could not parse timestamp \"{}\"", s);
        None
    }
}

// ── Month keys ────────────────────────────────────────────────────────────────

/// Calendar-month bucket key, `"%Y-%m"`. Keys sort chronologically.
pub fn month_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

/// First day of the month that contains `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Every month key from the month of `first` through the month of `last`,
/// inclusive. Empty when `last` precedes `first`.
pub fn month_keys_between(first: NaiveDate, last: NaiveDate) -> Vec<String> {
    let mut keys = Vec::new();
    let end = month_start(last);
    let mut cursor = month_start(first);
    while cursor <= end {
        keys.push(cursor.format("%Y-%m").to_string());
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    keys
}

// ── DateWindow ────────────────────────────────────────────────────────────────

/// The user's date filter.
///
/// Compared by calendar day: every record stamped on `from` matches and
/// nothing stamped on `to` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let day = ts.date();
        day >= self.from && day < self.to
    }

    /// Move both ends by `months` (negative moves backwards). Returns the
    /// window unchanged if the shift would leave chrono's date range.
    pub fn shift_months(&self, months: i32) -> Self {
        let shift = |d: NaiveDate| {
            if months >= 0 {
                d.checked_add_months(Months::new(months.unsigned_abs()))
            } else {
                d.checked_sub_months(Months::new(months.unsigned_abs()))
            }
        };
        match (shift(self.from), shift(self.to)) {
            (Some(from), Some(to)) => Self { from, to },
            _ => *self,
        }
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
