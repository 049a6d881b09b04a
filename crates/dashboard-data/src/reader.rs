//! CSV loading for the raw incident table.
//!
//! Columns are located by header name rather than position, so a reordered
//! or widened export still lands the right values in [`RawIncident`]. Only
//! the nine columns the dashboard uses are read; everything else is ignored.

use std::io::Read;
use std::path::Path;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::RawIncident;
use tracing::{debug, info, warn};

// ── Schema ────────────────────────────────────────────────────────────────────

/// Header names of the retained columns, in source order.
pub const SELECTED_COLUMNS: [&str; 9] = [
    "CrimeDateTime",
    "Description",
    "Weapon",
    "Gender",
    "Age",
    "Race",
    "Latitude",
    "Longitude",
    "PremiseType",
];

/// Cell contents treated as a missing value, matching the default NA
/// markers of common dataframe CSV loaders.
pub const MISSING_VALUE_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Positions of the retained columns within one particular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    crime_date_time: usize,
    description: usize,
    weapon: usize,
    gender: usize,
    age: usize,
    race: usize,
    latitude: usize,
    longitude: usize,
    premise_type: usize,
}

impl ColumnIndex {
    /// Resolve every selected column from the header row.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |wanted: &str| -> Result<usize> {
            names
                .iter()
                .position(|n| *n == wanted)
                .ok_or_else(|| DashboardError::MissingColumn(wanted.to_string()))
        };

        Ok(Self {
            crime_date_time: find("CrimeDateTime")?,
            description: find("Description")?,
            weapon: find("Weapon")?,
            gender: find("Gender")?,
            age: find("Age")?,
            race: find("Race")?,
            latitude: find("Latitude")?,
            longitude: find("Longitude")?,
            premise_type: find("PremiseType")?,
        })
    }

    fn extract(&self, record: &csv::StringRecord) -> RawIncident {
        RawIncident {
            crime_date_time: cell(record, self.crime_date_time),
            description: cell(record, self.description),
            weapon: cell(record, self.weapon),
            gender: cell(record, self.gender),
            age: cell(record, self.age),
            race: cell(record, self.race),
            latitude: coordinate(record, self.latitude),
            longitude: coordinate(record, self.longitude),
            premise_type: cell(record, self.premise_type),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Counters describing one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records turned into [`RawIncident`]s.
    pub rows_read: usize,
    /// Records the CSV parser rejected.
    pub rows_skipped: usize,
}

/// Read raw incidents from any CSV byte source.
///
/// Fails only when the header row cannot be read or lacks a selected column.
/// Individual malformed records are skipped and counted.
pub fn read_incidents<R: Read>(source: R) -> Result<(Vec<RawIncident>, LoadSummary)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;
    debug!("Resolved incident columns: {:?}", columns);

    let mut incidents = Vec::new();
    let mut summary = LoadSummary::default();

    for (i, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                incidents.push(columns.extract(&record));
                summary.rows_read += 1;
            }
            Err(e) => {
                // +2: one for the header row, one for 1-based numbering.
                warn!("Skipping malformed CSV record {}: {}", i + 2, e);
                summary.rows_skipped += 1;
            }
        }
    }

    Ok((incidents, summary))
}

/// Open `path` and read every raw incident from it.
pub fn load_incidents(path: &Path) -> Result<Vec<RawIncident>> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (incidents, summary) = read_incidents(std::io::BufReader::new(file))?;

    info!(
        "Loaded {} incidents from {} ({} malformed records skipped)",
        summary.rows_read,
        path.display(),
        summary.rows_skipped
    );

    Ok(incidents)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `true` when a cell holds no usable value.
pub fn is_missing(field: &str) -> bool {
    field.trim().is_empty() || MISSING_VALUE_TOKENS.contains(&field)
}

/// Text of the cell at `idx`, or `None` when absent. Short rows yield `None`.
fn cell(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|field| !is_missing(field))
        .map(str::to_string)
}

/// Coordinate at `idx`; unparseable text counts as absent.
fn coordinate(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    let text = cell(record, idx)?;
    text.trim().parse::<f64>().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
