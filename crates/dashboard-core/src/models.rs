use serde::{Deserialize, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Placeholder written into `Weapon` when the source left it blank.
pub const NO_WEAPON: &str = "No weapon";

/// Placeholder for absent `Race`, `PremiseType` and `Description` values.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel used for both unknown gender and unknown age.
pub const UNKNOWN_MARKER: &str = "U";

/// One row of the raw crime table, restricted to the nine columns the
/// dashboard uses.
///
/// Every field is optional: the source routinely leaves cells blank. Values
/// are kept as text except the coordinates, which are parsed on ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawIncident {
    pub crime_date_time: Option<String>,
    pub description: Option<String>,
    pub weapon: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub race: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub premise_type: Option<String>,
}

/// Normalised victim gender.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Gender {
    #[serde(rename = "M")]
    #[strum(serialize = "M")]
    Male,
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    Female,
    #[serde(rename = "U")]
    #[strum(serialize = "U")]
    Unknown,
}

/// Victim age after cleaning: either a plausible number of years or the
/// `"U"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Age {
    /// Strictly between 0 and 115.
    Years(u8),
    Unknown,
}

impl Age {
    /// Exclusive lower bound on a valid age.
    pub const MIN_EXCLUSIVE: i64 = 0;
    /// Exclusive upper bound on a valid age.
    pub const MAX_EXCLUSIVE: i64 = 115;

    /// The age in years, or `None` for the sentinel.
    pub fn years(self) -> Option<u8> {
        match self {
            Age::Years(y) => Some(y),
            Age::Unknown => None,
        }
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Age::Years(y) => write!(f, "{}", y),
            Age::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Age::Years(y) => serializer.serialize_u8(*y),
            Age::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

/// A row that has passed through the cleaning pipeline.
///
/// Field order matches the column order of the cleaned table, which is also
/// the header order used by the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedIncident {
    #[serde(rename = "CrimeDateTime")]
    pub crime_date_time: Option<String>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Weapon")]
    pub weapon: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Age")]
    pub age: Age,
    #[serde(rename = "Race")]
    pub race: String,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "PremiseType")]
    pub premise_type: String,
}

impl From<&CleanedIncident> for RawIncident {
    /// Re-express a cleaned row in raw form, so the pipeline can be run on its
    /// own output.
    fn from(c: &CleanedIncident) -> Self {
        RawIncident {
            crime_date_time: c.crime_date_time.clone(),
            description: Some(c.description.clone()),
            weapon: Some(c.weapon.clone()),
            gender: Some(c.gender.to_string()),
            age: Some(c.age.to_string()),
            race: Some(c.race.clone()),
            latitude: Some(c.latitude),
            longitude: Some(c.longitude),
            premise_type: Some(c.premise_type.clone()),
        }
    }
}

/// The ten crime descriptions tracked by the monthly composition chart.
///
/// Declaration order is the column order of the composition table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
pub enum TrackedCategory {
    #[strum(serialize = "LARCENY")]
    Larceny,
    #[strum(serialize = "COMMON ASSAULT")]
    CommonAssault,
    #[strum(serialize = "BURGLARY")]
    Burglary,
    #[strum(serialize = "HOMICIDE")]
    Homicide,
    #[strum(serialize = "AUTO THEFT")]
    AutoTheft,
    #[strum(serialize = "AGG. ASSAULT")]
    AggravatedAssault,
    #[strum(serialize = "ARSON")]
    Arson,
    #[strum(serialize = "RAPE")]
    Rape,
    #[strum(serialize = "ROBBERY")]
    Robbery,
    #[strum(serialize = "SHOOTING")]
    Shooting,
}

impl TrackedCategory {
    /// All tracked categories in table column order.
    pub fn all() -> Vec<TrackedCategory> {
        TrackedCategory::iter().collect()
    }

    /// Exact, case-sensitive match of a cleaned description.
    pub fn from_description(description: &str) -> Option<TrackedCategory> {
        description.parse().ok()
    }

    /// The description string records must carry to count for this category.
    pub fn description(self) -> &'static str {
        self.into()
    }

    /// Position of the category in the chart legend (1 = most frequent in the
    /// reference dataset).
    pub fn rank(self) -> u8 {
        match self {
            TrackedCategory::Larceny => 1,
            TrackedCategory::CommonAssault => 2,
            TrackedCategory::Burglary => 3,
            TrackedCategory::AggravatedAssault => 4,
            TrackedCategory::Robbery => 5,
            TrackedCategory::AutoTheft => 6,
            TrackedCategory::Shooting => 7,
            TrackedCategory::Homicide => 8,
            TrackedCategory::Rape => 9,
            TrackedCategory::Arson => 10,
        }
    }

    /// Legend label, e.g. `"4 - Aggravated Assault"`.
    pub fn legend(self) -> String {
        let name = match self {
            TrackedCategory::Larceny => "Larceny",
            TrackedCategory::CommonAssault => "Common Assault",
            TrackedCategory::Burglary => "Burglary",
            TrackedCategory::Homicide => "Homicide",
            TrackedCategory::AutoTheft => "Auto Theft",
            TrackedCategory::AggravatedAssault => "Aggravated Assault",
            TrackedCategory::Arson => "Arson",
            TrackedCategory::Rape => "Rape",
            TrackedCategory::Robbery => "Robbery",
            TrackedCategory::Shooting => "Shooting",
        };
        format!("{} - {}", self.rank(), name)
    }
}
