//! Per-column normalisation rules for raw crime records.
//!
//! Each processor is a stateless unit struct with associated functions, so
//! the cleaning pipeline can apply them row by row and tests can exercise a
//! single rule in isolation. None of them can fail: absent or malformed input
//! always resolves to a sentinel.

use crate::models::{Age, Gender, NO_WEAPON, UNKNOWN};

// ── WeaponNormalizer ──────────────────────────────────────────────────────────

/// Fills blank weapon cells.
pub struct WeaponNormalizer;

impl WeaponNormalizer {
    /// Absent → `"No weapon"`; anything else is kept verbatim.
    pub fn normalize(value: Option<&str>) -> String {
        value.unwrap_or(NO_WEAPON).to_string()
    }
}

// ── GenderNormalizer ──────────────────────────────────────────────────────────

/// Maps the free-text gender column onto `M` / `F` / `U`.
///
/// Matching is exact and case-sensitive against fixed tables; this is not a
/// general alias resolver.
pub struct GenderNormalizer;

impl GenderNormalizer {
    /// Known spellings that stand for a canonical value.
    pub const ALIASES: &'static [(&'static str, Gender)] = &[
        ("M", Gender::Male),
        ("F", Gender::Female),
        ("U", Gender::Unknown),
        ("Male", Gender::Male),
        ("Female", Gender::Female),
        ("W", Gender::Female),
        ("M\\", Gender::Male),
    ];

    /// Noise tokens observed in the source data that carry no usable gender.
    pub const NOISE_TOKENS: &'static [&'static str] = &[
        "B",
        "Transgende",
        "N",
        ",",
        "FB",
        "O",
        "160",
        "FW",
        "FU",
        "D",
        "60",
        "120",
        "8",
        "MB",
        "A",
        "77",
        "17",
        "FF",
        "165",
        "FM",
        "042819",
        "S",
        "T",
        "50",
    ];

    /// Resolve a raw gender cell.
    ///
    /// Absent values, listed noise tokens and anything outside both tables
    /// become [`Gender::Unknown`].
    pub fn normalize(value: Option<&str>) -> Gender {
        let Some(v) = value else {
            return Gender::Unknown;
        };
        Self::ALIASES
            .iter()
            .find(|(alias, _)| *alias == v)
            .map(|(_, g)| *g)
            .unwrap_or(Gender::Unknown)
    }

    /// `true` when `value` appears in either the alias table or the noise
    /// list. Used to report tokens the tables do not cover.
    pub fn is_recognised(value: &str) -> bool {
        Self::ALIASES.iter().any(|(alias, _)| *alias == value)
            || Self::NOISE_TOKENS.contains(&value)
    }
}

// ── AgeNormalizer ─────────────────────────────────────────────────────────────

/// Converts the age column into [`Age`].
pub struct AgeNormalizer;

impl AgeNormalizer {
    /// Resolve a raw age cell.
    ///
    /// The value must first read as a number; non-numeric text is
    /// [`Age::Unknown`]. Numbers `<= 0` or `>= 115` are out of range. Whole
    /// years are taken by truncation, and a fraction that truncates to zero
    /// is also out of range.
    pub fn normalize(value: Option<&str>) -> Age {
        let Some(raw) = value else {
            return Age::Unknown;
        };
        let Ok(number) = raw.trim().parse::<f64>() else {
            return Age::Unknown;
        };
        if !number.is_finite()
            || number <= Age::MIN_EXCLUSIVE as f64
            || number >= Age::MAX_EXCLUSIVE as f64
        {
            return Age::Unknown;
        }

        let years = number.trunc() as i64;
        if years <= Age::MIN_EXCLUSIVE {
            return Age::Unknown;
        }
        u8::try_from(years).map(Age::Years).unwrap_or(Age::Unknown)
    }
}

// ── Unknown fill ──────────────────────────────────────────────────────────────

/// Absent → `"UNKNOWN"`. Used for race, premise type and description.
pub fn fill_unknown(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).to_string()
}

// ── DescriptionCanonicalizer ──────────────────────────────────────────────────

/// Folds near-duplicate crime descriptions into their parent category.
pub struct DescriptionCanonicalizer;

impl DescriptionCanonicalizer {
    /// Exact-string replacements, applied to the description column only.
    pub const MERGES: &'static [(&'static str, &'static str)] = &[
        ("LARCENY FROM AUTO", "LARCENY"),
        ("ROBBERY - CARJACKING", "ROBBERY"),
        ("ROBBERY - COMMERCIAL", "ROBBERY"),
    ];

    /// Return the canonical form of `description`, or `None` when it is
    /// already canonical.
    pub fn canonical(description: &str) -> Option<&'static str> {
        Self::MERGES
            .iter()
            .find(|(from, _)| *from == description)
            .map(|(_, to)| *to)
    }
}

// ── LocationFilter ────────────────────────────────────────────────────────────

/// Outcome of checking a row's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationCheck {
    /// Both coordinates present and non-zero.
    Valid { latitude: f64, longitude: f64 },
    /// At least one coordinate absent.
    Missing,
    /// Both present, but one of them is exactly `0.0` (no GPS fix).
    Zero,
}

/// Decides whether a row has a usable map position.
pub struct LocationFilter;

impl LocationFilter {
    pub fn check(latitude: Option<f64>, longitude: Option<f64>) -> LocationCheck {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_nan() || lon.is_nan() => LocationCheck::Missing,
            (Some(lat), Some(lon)) => {
                if lat == 0.0 || lon == 0.0 {
                    LocationCheck::Zero
                } else {
                    LocationCheck::Valid {
                        latitude: lat,
                        longitude: lon,
                    }
                }
            }
            _ => LocationCheck::Missing,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
