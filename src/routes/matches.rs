use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::ScoringSettings;
use crate::core::Matcher;
use crate::models::{
    ErrorResponse, ExtractTokensRequest, ExtractTokensResponse, FindMatchesRequest,
    FindMatchesResponse, GeoPoint, HealthResponse, InstantMatchRequest, InstantMatchResponse,
    MatchPreferences, ScoringStrategy, WeightPreset,
};
use crate::services::extractor::normalize_tokens;
use crate::services::{Roster, TokenExtractor};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub extractor: Arc<TokenExtractor>,
    pub scoring: ScoringSettings,
    pub campus: Option<GeoPoint>,
    pub max_limit: u16,
}

impl AppState {
    /// Matcher for a weight preset, with the configured campus origin
    pub fn matcher(&self, preset: WeightPreset) -> Matcher {
        Matcher::new(self.scoring.weights(preset)).with_campus(self.campus)
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/instant", web::post().to(instant_matches))
        .route("/tokens/extract", web::post().to(extract_tokens));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.roster.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        roster_size: state.roster.len(),
        token_cache_entries: state.extractor.cache().stats().entries,
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "requester": { "id": "u1", "courses": ["CS 106B"], "location": {"lat": 37.43, "lng": -122.17} },
///   "requesterId": 12,
///   "candidates": [ ... ],
///   "preferences": { "course": "CS 106B", "gender": "any", "radiusKm": 5 },
///   "tokens": ["CSE", "CSE 230"],
///   "preset": "discovery",
///   "limit": 20,
///   "fallback": true
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    let req = req.into_inner();

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: field_errors={:?}", errors);
        return validation_error(errors);
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let limit = req.limit.min(state.max_limit) as usize;

    let requester = match (&req.requester, &req.requester_id) {
        (Some(profile), _) => Some(profile),
        (None, Some(id)) => match state.roster.find(id) {
            Some(profile) => Some(profile),
            None => {
                tracing::info!("[{}] Requester {} not found in roster", request_id, id);
                return HttpResponse::NotFound().json(ErrorResponse {
                    error: "Requester not found".to_string(),
                    message: format!("No profile with id {}", id),
                    status_code: 404,
                });
            }
        },
        (None, None) => None,
    };

    let candidates = req
        .candidates
        .as_deref()
        .unwrap_or_else(|| state.roster.profiles());

    let strategy = match &req.tokens {
        Some(tokens) => ScoringStrategy::ByExtractedToken(normalize_tokens(tokens)),
        None => ScoringStrategy::ByCourseCode,
    };

    tracing::info!(
        "[{}] Finding matches for {}, pool: {}, limit: {}",
        request_id,
        requester.map(|r| r.id.to_string()).unwrap_or_else(|| "anonymous".to_string()),
        candidates.len(),
        limit
    );

    let matcher = state.matcher(req.preset.unwrap_or_default());
    let result = if req.fallback {
        matcher.find_matches_or_fallback(
            requester,
            candidates,
            req.preferences.as_ref(),
            &strategy,
            Some(limit),
        )
    } else {
        matcher.find_matches(
            requester,
            candidates,
            req.preferences.as_ref(),
            &strategy,
            Some(limit),
        )
    };

    tracing::info!(
        "[{}] Returning {} matches ({:?} ranking, origin {:?}) from {} candidates",
        request_id,
        result.matches.len(),
        result.mode,
        result.origin,
        result.total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        request_id,
        matches: result.matches,
        mode: result.mode,
        origin: result.origin,
        total_candidates: result.total_candidates,
    })
}

/// Instant match endpoint
///
/// POST /api/v1/matches/instant
///
/// Extracts course/subject tokens from the requester's profile, ranks the
/// roster by token overlap within `radiusMiles`, and falls back to the demo
/// ranking when nothing scores.
async fn instant_matches(
    state: web::Data<AppState>,
    req: web::Json<InstantMatchRequest>,
) -> impl Responder {
    let req = req.into_inner();

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for instant_matches request: field_errors={:?}", errors);
        return validation_error(errors);
    }

    let request_id = uuid::Uuid::new_v4().to_string();
    let limit = req.limit.min(state.max_limit) as usize;

    let extraction = state.extractor.extract_profile(&req.requester).await;
    tracing::debug!(
        "[{}] Extracted {} tokens ({:?}) for {}",
        request_id,
        extraction.tokens.len(),
        extraction.source,
        req.requester.id
    );

    let preferences = MatchPreferences {
        radius_miles: req.radius_miles,
        ..Default::default()
    };
    let strategy = ScoringStrategy::ByExtractedToken(extraction.tokens.clone());

    let result = state
        .matcher(WeightPreset::Instant)
        .with_score_floor(0.0)
        .find_matches_or_fallback(
            Some(&req.requester),
            state.roster.profiles(),
            Some(&preferences),
            &strategy,
            Some(limit),
        );

    tracing::info!(
        "[{}] Returning {} instant matches ({:?} ranking) for {}",
        request_id,
        result.matches.len(),
        result.mode,
        req.requester.id
    );

    HttpResponse::Ok().json(InstantMatchResponse {
        request_id,
        matches: result.matches,
        mode: result.mode,
        tokens: extraction.tokens,
        token_source: extraction.source,
    })
}

/// Token extraction endpoint
///
/// POST /api/v1/tokens/extract
///
/// Request body: `{ "profile": { ... } }` or `{ "text": "..." }`
async fn extract_tokens(
    state: web::Data<AppState>,
    req: web::Json<ExtractTokensRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let extraction = match (&req.profile, &req.text) {
        (Some(profile), _) => state.extractor.extract_profile(profile).await,
        (None, Some(text)) => state.extractor.extract_text(text).await,
        (None, None) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message: "profile or text is required".to_string(),
                status_code: 400,
            });
        }
    };

    HttpResponse::Ok().json(ExtractTokensResponse {
        tokens: extraction.tokens,
        source: extraction.source,
    })
}
