//! CSV export of the cleaned set and the derived monthly tables.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use dashboard_core::models::{CleanedIncident, TrackedCategory};
use dashboard_core::{DashboardError, Result};
use tracing::info;

use crate::aggregator::{MonthlyComposition, MonthlyTotal};
use crate::analysis::DashboardSnapshot;

pub const CLEANED_FILE: &str = "cleaned_incidents.csv";
pub const TOTALS_FILE: &str = "monthly_totals.csv";
pub const COMPOSITION_FILE: &str = "monthly_composition.csv";

/// Header of the cleaned table, in column order.
pub const CLEANED_COLUMNS: [&str; 9] = [
    "CrimeDateTime",
    "Description",
    "Weapon",
    "Gender",
    "Age",
    "Race",
    "Longitude",
    "Latitude",
    "PremiseType",
];

fn writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(sink)
}

/// Write cleaned records with a header row, even when `incidents` is empty.
pub fn write_cleaned<W: Write>(sink: W, incidents: &[CleanedIncident]) -> Result<()> {
    let mut wtr = writer(sink);
    wtr.write_record(CLEANED_COLUMNS)?;
    for incident in incidents {
        wtr.serialize(incident)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_monthly_totals<W: Write>(sink: W, totals: &[MonthlyTotal]) -> Result<()> {
    let mut wtr = writer(sink);
    wtr.write_record(["Month", "Total"])?;
    for t in totals {
        wtr.write_record([t.month.as_str(), t.count.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Wide composition table: one column per tracked category, headed by its
/// legend label. Undefined percentages are written as empty cells.
pub fn write_composition<W: Write>(sink: W, composition: &[MonthlyComposition]) -> Result<()> {
    let categories = TrackedCategory::all();
    let mut wtr = writer(sink);

    let mut header = vec!["Month".to_string(), "Total".to_string()];
    header.extend(categories.iter().map(|c| c.legend()));
    wtr.write_record(&header)?;

    for row in composition {
        let mut record = vec![row.month.clone(), row.total.to_string()];
        record.extend(
            categories
                .iter()
                .map(|c| row.percent(*c).map(|p| p.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn create_file(path: &Path) -> Result<fs::File> {
    fs::File::create(path).map_err(|source| DashboardError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write all three tables into `dir`, creating it if needed.
///
/// The cleaned table holds the whole cleaned set; the monthly tables come
/// from `snapshot` and so reflect the current window.
pub fn export_all(
    dir: &Path,
    incidents: &[CleanedIncident],
    snapshot: &DashboardSnapshot,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| DashboardError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let cleaned = dir.join(CLEANED_FILE);
    write_cleaned(create_file(&cleaned)?, incidents)?;

    let totals = dir.join(TOTALS_FILE);
    write_monthly_totals(create_file(&totals)?, &snapshot.monthly_totals)?;

    let composition = dir.join(COMPOSITION_FILE);
    write_composition(create_file(&composition)?, &snapshot.composition)?;

    info!(
        "Exported {} cleaned records and {} monthly rows to {}",
        incidents.len(),
        snapshot.monthly_totals.len(),
        dir.display()
    );
    Ok(vec![cleaned, totals, composition])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{build_snapshot, DashboardQuery};
    use chrono::NaiveDate;
    use dashboard_core::models::{Age, Gender};
    use dashboard_core::time_utils::DateWindow;
    use tempfile::TempDir;

    fn incident(ts: &str, description: &str) -> CleanedIncident {
        CleanedIncident {
            crime_date_time: Some(ts.to_string()),
            description: description.to_string(),
            weapon: "FIREARM".to_string(),
            gender: Gender::Female,
            age: Age::Years(34),
            race: "BLACK_OR_AFRICAN_AMERICAN".to_string(),
            longitude: -76.6,
            latitude: 39.3,
            premise_type: "Row/Townhouse".to_string(),
        }
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    // ── write_cleaned ─────────────────────────────────────────────────────────

    #[test]
    fn test_write_cleaned_column_order_and_sentinels() {
        let mut unknown_age = incident("2014/03/05 10:00:00+00", "ARSON");
        unknown_age.age = Age::Unknown;
        unknown_age.gender = Gender::Unknown;
        unknown_age.crime_date_time = None;

        let mut buf = Vec::new();
        write_cleaned(&mut buf, &[incident("2014/03/05 10:00:00+00", "LARCENY"), unknown_age])
            .unwrap();
        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "CrimeDateTime,Description,Weapon,Gender,Age,Race,Longitude,Latitude,PremiseType"
        );
        assert_eq!(
            lines[1],
            "2014/03/05 10:00:00+00,LARCENY,FIREARM,F,34,BLACK_OR_AFRICAN_AMERICAN,-76.6,39.3,Row/Townhouse"
        );
        assert!(lines[2].starts_with(",ARSON,FIREARM,U,U,"));
    }

    #[test]
    fn test_write_cleaned_empty_still_has_header() {
        let mut buf = Vec::new();
        write_cleaned(&mut buf, &[]).unwrap();
        assert_eq!(to_string(buf).lines().count(), 1);
    }

    // ── write_composition ─────────────────────────────────────────────────────

    #[test]
    fn test_write_composition_missing_is_empty_cell() {
        let data = vec![
            incident("2014/01/05 10:00:00+00", "LARCENY"),
            incident("2014/03/05 10:00:00+00", "HOMICIDE"),
        ];
        let q = DashboardQuery {
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            ),
            highlighted: "LARCENY".to_string(),
        };
        let snap = build_snapshot(&data, &q);

        let mut buf = Vec::new();
        write_composition(&mut buf, &snap.composition).unwrap();
        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Month,Total,1 - Larceny,2 - Common Assault,3 - Burglary,"));
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("2014-01,1,100,0,0,"));
        assert_eq!(lines[2], format!("2014-02,0{}", ",".repeat(10)));
    }

    // ── export_all ────────────────────────────────────────────────────────────

    #[test]
    fn test_export_all_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("nested");
        let data = vec![incident("2014/01/05 10:00:00+00", "LARCENY")];
        let q = DashboardQuery {
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            ),
            highlighted: "LARCENY".to_string(),
        };
        let snap = build_snapshot(&data, &q);

        let written = export_all(&target, &data, &snap).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists(), "{}", path.display());
        }
        let totals = fs::read_to_string(target.join(TOTALS_FILE)).unwrap();
        assert_eq!(totals, "Month,Total\n2014-01,1\n");
    }

    #[test]
    fn test_export_all_unwritable_dir_is_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let target = blocker.join("out");
        let data = vec![incident("2014/01/05 10:00:00+00", "LARCENY")];
        let q = DashboardQuery {
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            ),
            highlighted: "LARCENY".to_string(),
        };
        let snap = build_snapshot(&data, &q);

        let err = export_all(&target, &data, &snap).unwrap_err();
        assert!(matches!(err, DashboardError::FileWrite { ref path, .. } if path == &target));
        assert!(err.to_string().starts_with("Failed to write file"));
    }
}
