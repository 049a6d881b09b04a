//! Monthly incident counts and per-category composition.
//!
//! Records are bucketed by calendar month of their parsed timestamp. The
//! month axis is continuous: every month between the first and the last
//! populated one appears, with a zero total when nothing happened in it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use dashboard_core::formatting::percent_of;
use dashboard_core::models::{CleanedIncident, TrackedCategory};
use dashboard_core::time_utils::{month_key, month_keys_between, DateWindow, TimestampProcessor};
use tracing::debug;

// ── TimedIncident ─────────────────────────────────────────────────────────────

/// A cleaned record paired with its parsed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct TimedIncident<'a> {
    pub incident: &'a CleanedIncident,
    pub timestamp: NaiveDateTime,
}

// ── Output rows ───────────────────────────────────────────────────────────────

/// Number of incidents in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    /// `"%Y-%m"`.
    pub month: String,
    pub count: u64,
}

/// One tracked category's slice of a month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryShare {
    pub count: u64,
    /// `100 * count / total`; `None` when the month has no incidents at all.
    pub percent: Option<f64>,
}

/// One row of the wide composition table.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyComposition {
    pub month: String,
    /// All incidents in the month, tracked category or not.
    pub total: u64,
    /// Exactly one entry per [`TrackedCategory`].
    pub shares: BTreeMap<TrackedCategory, CategoryShare>,
}

impl MonthlyComposition {
    /// Percentage for `category`, `None` when undefined.
    pub fn percent(&self, category: TrackedCategory) -> Option<f64> {
        self.shares.get(&category).and_then(|s| s.percent)
    }

    /// Sum of the tracked percentages; `None` for an empty month.
    pub fn tracked_percent_total(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.shares.values().filter_map(|s| s.percent).sum())
    }
}

/// Long-form view of the composition table: one row per (month, category).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    pub month: String,
    pub category: TrackedCategory,
    pub count: u64,
    pub percent: Option<f64>,
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that turns cleaned records into monthly series.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Keep records whose timestamp parses and falls on a day inside `window`.
    ///
    /// Records with an absent or unparseable timestamp are left out.
    pub fn filter_window<'a>(
        incidents: &'a [CleanedIncident],
        window: &DateWindow,
    ) -> Vec<TimedIncident<'a>> {
        let mut unparsed = 0usize;
        let timed: Vec<TimedIncident<'a>> = incidents
            .iter()
            .filter_map(|incident| {
                let parsed = incident
                    .crime_date_time
                    .as_deref()
                    .and_then(TimestampProcessor::parse);
                if parsed.is_none() {
                    unparsed += 1;
                }
                parsed.map(|timestamp| TimedIncident {
                    incident,
                    timestamp,
                })
            })
            .filter(|t| window.contains(&t.timestamp))
            .collect();

        debug!(
            "Window {}: {} of {} records kept ({} without a usable timestamp)",
            window,
            timed.len(),
            incidents.len(),
            unparsed
        );
        timed
    }

    /// Incident count per calendar month, chronological, with gap months
    /// reported as zero.
    pub fn monthly_totals(timed: &[TimedIncident<'_>]) -> Vec<MonthlyTotal> {
        let counts = Self::count_by_month(timed.iter());
        Self::month_axis(timed)
            .into_iter()
            .map(|month| {
                let count = counts.get(&month).copied().unwrap_or(0);
                MonthlyTotal { month, count }
            })
            .collect()
    }

    /// Per-category percentage of each month's incidents.
    ///
    /// Every month of [`Self::monthly_totals`] appears, and every tracked
    /// category appears in every month: a category absent from a populated
    /// month gets `0.0`, and every category of an empty month gets `None`.
    pub fn composition(timed: &[TimedIncident<'_>]) -> Vec<MonthlyComposition> {
        let totals = Self::monthly_totals(timed);

        let per_category: BTreeMap<TrackedCategory, BTreeMap<String, u64>> =
            TrackedCategory::all()
                .into_iter()
                .map(|cat| {
                    let series = Self::count_by_month(
                        timed
                            .iter()
                            .filter(|t| t.incident.description == cat.description()),
                    );
                    (cat, series)
                })
                .collect();

        totals
            .into_iter()
            .map(|MonthlyTotal { month, count: total }| {
                let shares = per_category
                    .iter()
                    .map(|(cat, series)| {
                        let count = series.get(&month).copied().unwrap_or(0);
                        (
                            *cat,
                            CategoryShare {
                                count,
                                percent: percent_of(count, total),
                            },
                        )
                    })
                    .collect();
                MonthlyComposition {
                    month,
                    total,
                    shares,
                }
            })
            .collect()
    }

    /// Flatten a composition table into (month, category) rows.
    pub fn long_form(composition: &[MonthlyComposition]) -> Vec<MonthlyAggregate> {
        composition
            .iter()
            .flat_map(|row| {
                row.shares.iter().map(move |(cat, share)| MonthlyAggregate {
                    month: row.month.clone(),
                    category: *cat,
                    count: share.count,
                    percent: share.percent,
                })
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn count_by_month<'a, 'b: 'a>(
        timed: impl Iterator<Item = &'a TimedIncident<'b>>,
    ) -> BTreeMap<String, u64> {
        let mut map: BTreeMap<String, u64> = BTreeMap::new();
        for t in timed {
            *map.entry(month_key(&t.timestamp)).or_default() += 1;
        }
        map
    }

    /// Continuous month keys covering the earliest to the latest record.
    fn month_axis(timed: &[TimedIncident<'_>]) -> Vec<String> {
        let first = timed.iter().map(|t| t.timestamp).min();
        let last = timed.iter().map(|t| t.timestamp).max();
        match (first, last) {
            (Some(first), Some(last)) => month_keys_between(first.date(), last.date()),
            _ => Vec::new(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
