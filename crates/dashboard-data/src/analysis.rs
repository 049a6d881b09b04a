//! Snapshot pipeline for the crime dashboard.
//!
//! [`load_and_clean`] runs once at startup. Every filter change afterwards
//! calls [`build_snapshot`] with the read-only cleaned set and the current
//! [`DashboardQuery`], producing a fresh [`DashboardSnapshot`] for the UI.

use std::collections::HashMap;
use std::path::Path;

use dashboard_core::models::CleanedIncident;
use dashboard_core::time_utils::DateWindow;
use dashboard_core::Result;
use tracing::info;

use crate::aggregator::{MonthlyAggregator, MonthlyComposition, MonthlyTotal};
use crate::cleaner::{clean_incidents, CleanedDataset};
use crate::reader::load_incidents;

// ── Public types ──────────────────────────────────────────────────────────────

/// Filter parameters chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub window: DateWindow,
    /// Description drawn in the highlight colour on the map. Does not filter.
    pub highlighted: String,
}

/// One incident location on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub highlighted: bool,
}

/// Timing and size information for one snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    /// Size of the cleaned set the snapshot was built from.
    pub records_total: usize,
    /// Records left after the date-window filter.
    pub records_in_window: usize,
    /// Wall-clock seconds spent building the snapshot.
    pub build_time_seconds: f64,
}

/// Everything the presentation layer needs for one filter state.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub query: DashboardQuery,
    /// Records inside the window, in dataset order.
    pub records: Vec<CleanedIncident>,
    /// `(description, count)` sorted by count descending, then name.
    pub description_counts: Vec<(String, u64)>,
    pub monthly_totals: Vec<MonthlyTotal>,
    pub composition: Vec<MonthlyComposition>,
    pub map_points: Vec<MapPoint>,
    /// Mean `(latitude, longitude)` of the window, `None` when empty.
    pub map_center: Option<(f64, f64)>,
    pub metadata: SnapshotMetadata,
}

impl DashboardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records matching the highlighted description.
    pub fn highlighted_count(&self) -> usize {
        self.map_points.iter().filter(|p| p.highlighted).count()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Read the CSV at `path` and run the cleaning pipeline over it.
pub fn load_and_clean(path: &Path) -> Result<CleanedDataset> {
    let raw = load_incidents(path)?;
    Ok(clean_incidents(&raw))
}

/// Distinct descriptions of the cleaned set, in order of first appearance.
pub fn distinct_descriptions(incidents: &[CleanedIncident]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    incidents
        .iter()
        .filter(|i| seen.insert(i.description.as_str()))
        .map(|i| i.description.clone())
        .collect()
}

/// Recompute every derived view for `query`.
///
/// 1. Keep records dated from the window start up to, not including, its end day.
/// 2. Count records per description.
/// 3. Build the monthly totals and composition tables.
/// 4. Project records to map points and compute the map centre.
pub fn build_snapshot(incidents: &[CleanedIncident], query: &DashboardQuery) -> DashboardSnapshot {
    let start = std::time::Instant::now();

    // ── Step 1: Window ────────────────────────────────────────────────────────
    let timed = MonthlyAggregator::filter_window(incidents, &query.window);
    let records: Vec<CleanedIncident> = timed.iter().map(|t| t.incident.clone()).collect();

    // ── Step 2: Description counts ────────────────────────────────────────────
    let description_counts = count_descriptions(&records);

    // ── Step 3: Monthly tables ────────────────────────────────────────────────
    let monthly_totals = MonthlyAggregator::monthly_totals(&timed);
    let composition = MonthlyAggregator::composition(&timed);

    // ── Step 4: Map ───────────────────────────────────────────────────────────
    let map_points: Vec<MapPoint> = records
        .iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            description: r.description.clone(),
            highlighted: r.description == query.highlighted,
        })
        .collect();
    let map_center = mean_location(&records);

    let metadata = SnapshotMetadata {
        records_total: incidents.len(),
        records_in_window: records.len(),
        build_time_seconds: start.elapsed().as_secs_f64(),
    };

    info!(
        "Snapshot {} (highlight {:?}): {} records, {} months",
        query.window,
        query.highlighted,
        metadata.records_in_window,
        monthly_totals.len()
    );

    DashboardSnapshot {
        query: query.clone(),
        records,
        description_counts,
        monthly_totals,
        composition,
        map_points,
        map_center,
        metadata,
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn count_descriptions(records: &[CleanedIncident]) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for r in records {
        *counts.entry(r.description.as_str()).or_default() += 1;
    }
    let mut sorted: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(desc, n)| (desc.to_string(), n))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

fn mean_location(records: &[CleanedIncident]) -> Option<(f64, f64)> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let lat = records.iter().map(|r| r.latitude).sum::<f64>() / n;
    let lon = records.iter().map(|r| r.longitude).sum::<f64>() / n;
    Some((lat, lon))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{Age, Gender, TrackedCategory};
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "X,Y,RowID,CCNumber,CrimeDateTime,CrimeCode,Description,Inside_Outside,Weapon,Post,Gender,Age,Race,Ethnicity,Location,Old_District,New_District,Neighborhood,Latitude,Longitude,GeoLocation,PremiseType,Total_Incidents";

    fn incident(ts: &str, description: &str, lat: f64, lon: f64) -> CleanedIncident {
        CleanedIncident {
            crime_date_time: Some(ts.to_string()),
            description: description.to_string(),
            weapon: "No weapon".to_string(),
            gender: Gender::Unknown,
            age: Age::Unknown,
            race: "UNKNOWN".to_string(),
            longitude: lon,
            latitude: lat,
            premise_type: "UNKNOWN".to_string(),
        }
    }

    fn query(highlighted: &str) -> DashboardQuery {
        DashboardQuery {
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            ),
            highlighted: highlighted.to_string(),
        }
    }

    fn sample() -> Vec<CleanedIncident> {
        vec![
            incident("2014/03/05 10:00:00+00", "LARCENY", 39.30, -76.60),
            incident("2014/03/20 10:00:00+00", "HOMICIDE", 39.32, -76.62),
            incident("2014/05/02 10:00:00+00", "LARCENY", 39.28, -76.58),
            incident("2013/12/31 10:00:00+00", "ARSON", 39.00, -76.00),
        ]
    }

    // ── distinct_descriptions ─────────────────────────────────────────────────

    #[test]
    fn test_distinct_descriptions_first_appearance_order() {
        let names = distinct_descriptions(&sample());
        assert_eq!(names, vec!["LARCENY", "HOMICIDE", "ARSON"]);
    }

    #[test]
    fn test_distinct_descriptions_empty() {
        assert!(distinct_descriptions(&[]).is_empty());
    }

    // ── build_snapshot ────────────────────────────────────────────────────────

    #[test]
    fn test_build_snapshot_applies_window() {
        let snap = build_snapshot(&sample(), &query("LARCENY"));
        assert_eq!(snap.records.len(), 3);
        assert_eq!(snap.metadata.records_total, 4);
        assert_eq!(snap.metadata.records_in_window, 3);
        assert!(snap.records.iter().all(|r| r.description != "ARSON"));
    }

    #[test]
    fn test_build_snapshot_monthly_tables() {
        let snap = build_snapshot(&sample(), &query("LARCENY"));
        let months: Vec<(&str, u64)> = snap
            .monthly_totals
            .iter()
            .map(|t| (t.month.as_str(), t.count))
            .collect();
        assert_eq!(months, vec![("2014-03", 2), ("2014-04", 0), ("2014-05", 1)]);

        assert_eq!(snap.composition.len(), 3);
        assert_eq!(snap.composition[0].percent(TrackedCategory::Larceny), Some(50.0));
        assert_eq!(snap.composition[0].percent(TrackedCategory::Homicide), Some(50.0));
        assert_eq!(snap.composition[1].percent(TrackedCategory::Larceny), None);
        assert_eq!(snap.composition[2].percent(TrackedCategory::Larceny), Some(100.0));
    }

    #[test]
    fn test_build_snapshot_description_counts_sorted() {
        let snap = build_snapshot(&sample(), &query("LARCENY"));
        assert_eq!(
            snap.description_counts,
            vec![("LARCENY".to_string(), 2), ("HOMICIDE".to_string(), 1)]
        );
    }

    #[test]
    fn test_build_snapshot_highlight_only_colours() {
        let a = build_snapshot(&sample(), &query("LARCENY"));
        let b = build_snapshot(&sample(), &query("HOMICIDE"));
        assert_eq!(a.records, b.records);
        assert_eq!(a.composition, b.composition);
        assert_eq!(a.highlighted_count(), 2);
        assert_eq!(b.highlighted_count(), 1);
    }

    #[test]
    fn test_build_snapshot_map_center_is_mean() {
        let snap = build_snapshot(&sample(), &query("LARCENY"));
        let (lat, lon) = snap.map_center.unwrap();
        assert!((lat - 39.30).abs() < 1e-9);
        assert!((lon - -76.60).abs() < 1e-9);
    }

    #[test]
    fn test_build_snapshot_narrow_window_is_empty() {
        let mut q = query("LARCENY");
        q.window = DateWindow::new(
            NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2016, 2, 1).unwrap(),
        );
        let snap = build_snapshot(&sample(), &q);
        assert!(snap.is_empty());
        assert!(snap.monthly_totals.is_empty());
        assert!(snap.composition.is_empty());
        assert!(snap.map_center.is_none());
    }

    // ── load_and_clean ────────────────────────────────────────────────────────

    #[test]
    fn test_load_and_clean_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crimes.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "{HEADER}").unwrap();
        writeln!(
            f,
            "1,2,1,A1,2014/03/05 10:00:00+00,6D,LARCENY FROM AUTO,O,,111,Male,200,,,X,S,S,N,39.3,-76.6,,Street,1"
        )
        .unwrap();
        writeln!(
            f,
            "1,2,2,A2,2014/03/06 10:00:00+00,1A,HOMICIDE,O,FIREARM,111,W,34,BLACK,,X,S,S,N,0,-76.6,,Row,1"
        )
        .unwrap();
        drop(f);

        let dataset = load_and_clean(&path).unwrap();
        assert_eq!(dataset.incidents.len(), 1);
        let only = &dataset.incidents[0];
        assert_eq!(only.description, "LARCENY");
        assert_eq!(only.gender, Gender::Male);
        assert_eq!(only.age, Age::Unknown);
        assert_eq!(only.weapon, "No weapon");
        assert_eq!(only.race, "UNKNOWN");
        assert_eq!(dataset.report.dropped_zero_location, 1);
    }

    #[test]
    fn test_load_and_clean_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_and_clean(&dir.path().join("absent.csv")).is_err());
    }
}
