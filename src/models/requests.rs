use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{MatchPreferences, Profile, ProfileId, WeightPreset};

/// Request to find matches
///
/// The requester is taken from `requester`, or looked up in the roster by
/// `requesterId`. The pool is `candidates`, or the whole roster when absent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequest {
    #[serde(default)]
    pub requester: Option<Profile>,
    #[serde(default)]
    pub requester_id: Option<ProfileId>,
    #[serde(default)]
    pub candidates: Option<Vec<Profile>>,
    #[serde(default)]
    pub preferences: Option<MatchPreferences>,
    /// Extracted tokens; when present scoring switches to token overlap
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(default)]
    pub preset: Option<WeightPreset>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: u16,
    /// Allow the demo fallback ranking when filtering leaves nothing
    #[serde(default = "default_true")]
    pub fallback: bool,
}

fn default_limit() -> u16 {
    20
}

fn default_true() -> bool {
    true
}

/// Request for instant, token-driven matching against the roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InstantMatchRequest {
    pub requester: Profile,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default)]
    pub radius_miles: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_instant_limit")]
    pub limit: u16,
}

fn default_instant_limit() -> u16 {
    10
}

/// Request to extract course/subject tokens
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_extract_source"))]
pub struct ExtractTokensRequest {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub text: Option<String>,
}

fn validate_extract_source(req: &ExtractTokensRequest) -> Result<(), ValidationError> {
    let has_text = req.text.as_deref().is_some_and(|t| !t.trim().is_empty());
    if req.profile.is_some() || has_text {
        Ok(())
    } else {
        Err(ValidationError::new("profile_or_text_required"))
    }
}
