use serde::{Deserialize, Serialize};

use crate::models::domain::{OriginSource, RankingMode, ScoredCandidate};
use crate::services::extractor::TokenSource;

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub request_id: String,
    pub matches: Vec<ScoredCandidate>,
    pub mode: RankingMode,
    pub origin: OriginSource,
    pub total_candidates: usize,
}

/// Response for instant match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantMatchResponse {
    pub request_id: String,
    pub matches: Vec<ScoredCandidate>,
    pub mode: RankingMode,
    pub tokens: Vec<String>,
    pub token_source: TokenSource,
}

/// Response for token extraction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTokensResponse {
    pub tokens: Vec<String>,
    pub source: TokenSource,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub roster_size: usize,
    pub token_cache_entries: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
