//! The cleaning pipeline: raw incident rows in, cleaned rows out.
//!
//! Every column rule lives in [`dashboard_core::data_processors`]; this module
//! only sequences them and keeps count of what changed. The pipeline is a pure
//! function of its input and is idempotent on its own output.

use dashboard_core::data_processors::{
    fill_unknown, AgeNormalizer, DescriptionCanonicalizer, GenderNormalizer, LocationCheck,
    LocationFilter, WeaponNormalizer,
};
use dashboard_core::models::{Age, CleanedIncident, RawIncident};
use tracing::{debug, info};

// ── CleaningReport ────────────────────────────────────────────────────────────

/// What the pipeline did to one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows removed because a coordinate was absent.
    pub dropped_missing_location: usize,
    /// Rows removed because a coordinate was exactly zero.
    pub dropped_zero_location: usize,
    /// Kept rows whose description was folded into a parent category.
    pub descriptions_merged: usize,
    /// Kept rows whose gender cell matched neither the alias table nor the
    /// known noise tokens.
    pub unrecognised_gender_tokens: usize,
    /// Kept rows whose age ended up as the sentinel.
    pub ages_unknown: usize,
}

/// Output of [`clean_incidents`].
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    pub incidents: Vec<CleanedIncident>,
    pub report: CleaningReport,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Clean a single row. Returns `None` when the row has no usable location.
pub fn clean_incident(raw: &RawIncident) -> Option<CleanedIncident> {
    match LocationFilter::check(raw.latitude, raw.longitude) {
        LocationCheck::Valid {
            latitude,
            longitude,
        } => Some(normalize_fields(raw, latitude, longitude)),
        LocationCheck::Missing | LocationCheck::Zero => None,
    }
}

/// Apply the per-column rules to a row whose coordinates already passed
/// [`LocationFilter::check`].
fn normalize_fields(raw: &RawIncident, latitude: f64, longitude: f64) -> CleanedIncident {
    let description = fill_unknown(raw.description.as_deref());
    let description = match DescriptionCanonicalizer::canonical(&description) {
        Some(canonical) => canonical.to_string(),
        None => description,
    };

    CleanedIncident {
        crime_date_time: raw.crime_date_time.clone(),
        description,
        weapon: WeaponNormalizer::normalize(raw.weapon.as_deref()),
        gender: GenderNormalizer::normalize(raw.gender.as_deref()),
        age: AgeNormalizer::normalize(raw.age.as_deref()),
        race: fill_unknown(raw.race.as_deref()),
        longitude,
        latitude,
        premise_type: fill_unknown(raw.premise_type.as_deref()),
    }
}

/// Run the full cleaning pipeline over `raw`, preserving row order.
pub fn clean_incidents(raw: &[RawIncident]) -> CleanedDataset {
    let mut report = CleaningReport {
        rows_in: raw.len(),
        ..Default::default()
    };
    let mut incidents = Vec::with_capacity(raw.len());

    for row in raw {
        let cleaned = match LocationFilter::check(row.latitude, row.longitude) {
            LocationCheck::Missing => {
                report.dropped_missing_location += 1;
                continue;
            }
            LocationCheck::Zero => {
                report.dropped_zero_location += 1;
                continue;
            }
            LocationCheck::Valid {
                latitude,
                longitude,
            } => normalize_fields(row, latitude, longitude),
        };

        if let Some(desc) = row.description.as_deref() {
            if DescriptionCanonicalizer::canonical(desc).is_some() {
                report.descriptions_merged += 1;
            }
        }
        if let Some(gender) = row.gender.as_deref() {
            if !GenderNormalizer::is_recognised(gender) {
                debug!("Unrecognised gender token {:?} mapped to U", gender);
                report.unrecognised_gender_tokens += 1;
            }
        }
        if cleaned.age == Age::Unknown {
            report.ages_unknown += 1;
        }

        incidents.push(cleaned);
    }

    report.rows_out = incidents.len();

    info!(
        "Cleaned {} rows → {} kept ({} missing location, {} zero location, {} descriptions merged, {} unrecognised gender tokens, {} unknown ages)",
        report.rows_in,
        report.rows_out,
        report.dropped_missing_location,
        report.dropped_zero_location,
        report.descriptions_merged,
        report.unrecognised_gender_tokens,
        report.ages_unknown,
    );

    CleanedDataset { incidents, report }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::Gender;

    fn raw(gender: Option<&str>, age: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> RawIncident {
        RawIncident {
            crime_date_time: Some("2014/05/01 12:00:00+00".to_string()),
            description: Some("COMMON ASSAULT".to_string()),
            weapon: Some("HANDS".to_string()),
            gender: gender.map(str::to_string),
            age: age.map(str::to_string),
            race: Some("WHITE".to_string()),
            latitude: lat,
            longitude: lon,
            premise_type: Some("STREET".to_string()),
        }
    }

    fn messy_rows() -> Vec<RawIncident> {
        let descriptions = [
            "LARCENY FROM AUTO",
            "ROBBERY - CARJACKING",
            "ROBBERY - COMMERCIAL",
            "BURGLARY",
        ];
        let genders = [Some("Male"), Some("W"), Some("160"), None, Some("F"), Some("X")];
        let ages = [Some("200"), Some("0"), Some("abc"), None, Some("45"), Some("12.0")];
        let coords = [
            (Some(39.3), Some(-76.6)),
            (Some(0.0), Some(-76.6)),
            (None, Some(-76.6)),
            (Some(39.2), Some(0.0)),
            (Some(39.25), Some(-76.55)),
        ];

        let mut rows = Vec::new();
        for (i, desc) in descriptions.iter().enumerate() {
            for (j, gender) in genders.iter().enumerate() {
                let age = ages[(i + j) % ages.len()];
                let (lat, lon) = coords[(i * 3 + j) % coords.len()];
                rows.push(RawIncident {
                    crime_date_time: Some(format!("2014/0{}/1{} 08:00:00+00", i + 1, j)),
                    description: Some(desc.to_string()),
                    weapon: if j % 2 == 0 { None } else { Some("KNIFE".to_string()) },
                    gender: gender.map(str::to_string),
                    age: age.map(str::to_string),
                    race: if j % 3 == 0 { None } else { Some("ASIAN".to_string()) },
                    latitude: lat,
                    longitude: lon,
                    premise_type: if j % 2 == 1 { None } else { Some("STREET".to_string()) },
                });
            }
        }
        rows
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_zero_latitude_row_dropped() {
        let row = RawIncident {
            crime_date_time: Some("2014/05/01 12:00:00+00".to_string()),
            description: Some("LARCENY FROM AUTO".to_string()),
            weapon: None,
            gender: Some("Male".to_string()),
            age: Some("200".to_string()),
            race: None,
            latitude: Some(0.0),
            longitude: Some(-76.6),
            premise_type: None,
        };
        let out = clean_incidents(&[row]);
        assert!(out.incidents.is_empty());
        assert_eq!(out.report.dropped_zero_location, 1);
    }

    #[test]
    fn test_scenario_same_row_with_location_cleans_fully() {
        let row = RawIncident {
            crime_date_time: Some("2014/05/01 12:00:00+00".to_string()),
            description: Some("LARCENY FROM AUTO".to_string()),
            weapon: None,
            gender: Some("Male".to_string()),
            age: Some("200".to_string()),
            race: None,
            latitude: Some(39.29),
            longitude: Some(-76.6),
            premise_type: None,
        };
        let c = clean_incident(&row).unwrap();
        assert_eq!(c.gender, Gender::Male);
        assert_eq!(c.age, Age::Unknown);
        assert_eq!(c.weapon, "No weapon");
        assert_eq!(c.race, "UNKNOWN");
        assert_eq!(c.premise_type, "UNKNOWN");
        assert_eq!(c.description, "LARCENY");
    }

    #[test]
    fn test_scenario_gender_w_is_female() {
        let c = clean_incident(&raw(Some("W"), Some("30"), Some(39.3), Some(-76.6))).unwrap();
        assert_eq!(c.gender, Gender::Female);
    }

    #[test]
    fn test_scenario_gender_160_is_unknown() {
        let c = clean_incident(&raw(Some("160"), Some("30"), Some(39.3), Some(-76.6))).unwrap();
        assert_eq!(c.gender, Gender::Unknown);
    }

    // ── Row handling ──────────────────────────────────────────────────────────

    #[test]
    fn test_missing_coordinates_dropped() {
        let rows = vec![
            raw(Some("M"), Some("30"), None, Some(-76.6)),
            raw(Some("M"), Some("30"), Some(39.3), None),
            raw(Some("M"), Some("30"), Some(39.3), Some(-76.6)),
        ];
        let out = clean_incidents(&rows);
        assert_eq!(out.incidents.len(), 1);
        assert_eq!(out.report.dropped_missing_location, 2);
        assert_eq!(out.report.rows_in, 3);
        assert_eq!(out.report.rows_out, 1);
    }

    #[test]
    fn test_row_order_preserved() {
        let mut a = raw(Some("M"), Some("30"), Some(39.3), Some(-76.6));
        a.description = Some("ARSON".to_string());
        let mut b = raw(Some("M"), Some("30"), Some(39.3), Some(-76.6));
        b.description = Some("RAPE".to_string());
        let out = clean_incidents(&[a, b]);
        assert_eq!(out.incidents[0].description, "ARSON");
        assert_eq!(out.incidents[1].description, "RAPE");
    }

    #[test]
    fn test_absent_description_becomes_unknown() {
        let mut r = raw(Some("M"), Some("30"), Some(39.3), Some(-76.6));
        r.description = None;
        assert_eq!(clean_incident(&r).unwrap().description, "UNKNOWN");
    }

    #[test]
    fn test_canonicalisation_scoped_to_description() {
        let mut r = raw(Some("M"), Some("30"), Some(39.3), Some(-76.6));
        r.premise_type = Some("LARCENY FROM AUTO".to_string());
        r.weapon = Some("ROBBERY - COMMERCIAL".to_string());
        let c = clean_incident(&r).unwrap();
        assert_eq!(c.premise_type, "LARCENY FROM AUTO");
        assert_eq!(c.weapon, "ROBBERY - COMMERCIAL");
    }

    #[test]
    fn test_report_counts() {
        let rows = vec![
            {
                let mut r = raw(Some("Q"), Some("abc"), Some(39.3), Some(-76.6));
                r.description = Some("ROBBERY - CARJACKING".to_string());
                r
            },
            raw(Some("Male"), Some("25"), Some(39.3), Some(-76.6)),
        ];
        let out = clean_incidents(&rows);
        assert_eq!(out.report.descriptions_merged, 1);
        assert_eq!(out.report.unrecognised_gender_tokens, 1);
        assert_eq!(out.report.ages_unknown, 1);
    }

    #[test]
    fn test_empty_input() {
        let out = clean_incidents(&[]);
        assert!(out.incidents.is_empty());
        assert_eq!(out.report, CleaningReport::default());
    }

    #[test]
    fn test_batch_matches_single_row_cleaning() {
        let rows = messy_rows();
        let single: Vec<CleanedIncident> = rows.iter().filter_map(clean_incident).collect();
        let batch = clean_incidents(&rows);
        assert_eq!(batch.incidents, single);
        assert_eq!(
            batch.report.rows_in - batch.report.rows_out,
            batch.report.dropped_missing_location + batch.report.dropped_zero_location
        );
    }

    // ── Invariants ────────────────────────────────────────────────────────────

    #[test]
    fn test_invariants_hold_on_messy_input() {
        let out = clean_incidents(&messy_rows());
        assert!(!out.incidents.is_empty());

        for c in &out.incidents {
            assert!(matches!(c.gender, Gender::Male | Gender::Female | Gender::Unknown));
            match c.age {
                Age::Years(y) => assert!(y > 0 && y < 115, "age {y}"),
                Age::Unknown => {}
            }
            assert!(c.latitude != 0.0 && !c.latitude.is_nan());
            assert!(c.longitude != 0.0 && !c.longitude.is_nan());
            assert!(!c.weapon.is_empty());
            assert!(!c.race.is_empty());
            assert!(!c.premise_type.is_empty());
            assert!(
                !["LARCENY FROM AUTO", "ROBBERY - CARJACKING", "ROBBERY - COMMERCIAL"]
                    .contains(&c.description.as_str()),
                "description {}",
                c.description
            );
        }
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = clean_incidents(&messy_rows());
        let reraw: Vec<RawIncident> = first.incidents.iter().map(RawIncident::from).collect();
        let second = clean_incidents(&reraw);

        assert_eq!(first.incidents, second.incidents);
        assert_eq!(second.report.dropped_missing_location, 0);
        assert_eq!(second.report.dropped_zero_location, 0);
        assert_eq!(second.report.descriptions_merged, 0);
    }
}
