use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Profile identifier. Document stores hand out string ids while the demo
/// roster uses integers, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileId::Number(n) => write!(f, "{}", n),
            ProfileId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        ProfileId::Text(value.to_string())
    }
}

impl From<i64> for ProfileId {
    fn from(value: i64) -> Self {
        ProfileId::Number(value)
    }
}

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude", alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are finite numbers
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Student profile with the attributes relevant to matching
///
/// Every field except `id` may be missing; missing fields are treated as
/// empty and never cause an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_courses")]
    pub courses: Vec<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub study_style: Option<String>,
    #[serde(default)]
    pub study_spot: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    /// Demo-only compatibility signal (0-100), read by fallback ranking
    #[serde(default)]
    pub compatibility: Option<u8>,
}

impl Profile {
    /// Bare profile with only an id set
    pub fn new(id: impl Into<ProfileId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            major: None,
            year: None,
            courses: Vec::new(),
            availability: None,
            location: None,
            gender: None,
            bio: None,
            study_style: None,
            study_spot: None,
            photo: None,
            compatibility: None,
        }
    }

    /// Location if both coordinates are finite
    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.location.filter(GeoPoint::is_finite)
    }
}

/// Courses arrive either as a list or as the comma-separated string the
/// profile editor stores.
fn deserialize_courses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Courses {
        List(Vec<Option<String>>),
        Csv(String),
        Missing(()),
    }

    let courses = match Courses::deserialize(deserializer)? {
        Courses::List(list) => list
            .into_iter()
            .flatten()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        Courses::Csv(csv) => csv
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        Courses::Missing(()) => Vec::new(),
    };

    Ok(courses)
}

/// Requester-supplied match constraints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreferences {
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub radius_miles: Option<f64>,
}

impl MatchPreferences {
    /// Effective search radius in kilometres.
    ///
    /// `radius_km` wins over `radius_miles`; non-finite and non-positive
    /// values disable the filter.
    pub fn radius_km(&self) -> Option<f64> {
        let radius = self
            .radius_km
            .or_else(|| self.radius_miles.map(crate::core::distance::miles_to_km))?;

        if radius.is_finite() && radius > 0.0 {
            Some(radius)
        } else {
            None
        }
    }

    /// Gender filter value, or None when unset or "any"
    pub fn gender_filter(&self) -> Option<String> {
        self.gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("any"))
            .map(str::to_lowercase)
    }

    /// Required course code, or None when unset or blank
    pub fn course_filter(&self) -> Option<&str> {
        self.course.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// A ranked candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub profile: Profile,
    pub distance_km: Option<f64>,
    pub score: f64,
}

/// Which ranking pass produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Primary,
    Fallback,
}

/// Where the distance origin came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginSource {
    Requester,
    Campus,
    Unresolved,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Radius constraint around a resolved origin
#[derive(Debug, Clone, Copy)]
pub struct RadiusConstraint {
    pub origin: GeoPoint,
    pub radius_km: f64,
    /// Pre-filter box, absent when the box would wrap a pole or the
    /// antimeridian
    pub bounding_box: Option<BoundingBox>,
}

/// Hard constraints applied before scoring
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub exclude_id: Option<ProfileId>,
    /// Normalized course code every candidate must take
    pub course: Option<String>,
    /// Lowercased gender every candidate must match
    pub gender: Option<String>,
    pub radius: Option<RadiusConstraint>,
}

/// How course affinity is scored for one call
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringStrategy {
    /// Literal course-code overlap between requester and candidate
    ByCourseCode,
    /// Free-text tokens from an external extraction step matched against
    /// candidate course codes
    ByExtractedToken(Vec<String>),
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        ScoringStrategy::ByCourseCode
    }
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Points per shared course code
    pub course_overlap: f64,
    /// Points per token contained in a candidate course
    pub token_substring: f64,
    /// Points per token prefixing a candidate course
    pub token_prefix: f64,
    pub token_prefix_min_len: usize,
    pub major: f64,
    pub availability: f64,
    /// Proximity bonus at zero distance
    pub proximity_cap: f64,
    /// Points lost per kilometre
    pub proximity_km_factor: f64,
}

impl ScoringWeights {
    /// Weights used by the discovery deck
    pub const fn discovery() -> Self {
        Self {
            course_overlap: 30.0,
            token_substring: 40.0,
            token_prefix: 20.0,
            token_prefix_min_len: 3,
            major: 20.0,
            availability: 10.0,
            proximity_cap: 30.0,
            proximity_km_factor: 10.0,
        }
    }

    /// Weights used by instant matching
    pub const fn instant() -> Self {
        Self {
            course_overlap: 40.0,
            token_substring: 40.0,
            token_prefix: 20.0,
            token_prefix_min_len: 3,
            major: 20.0,
            availability: 10.0,
            proximity_cap: 30.0,
            proximity_km_factor: 6.0,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::discovery()
    }
}

/// Named weight preset selectable per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPreset {
    #[default]
    Discovery,
    Instant,
}
