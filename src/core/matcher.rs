use crate::core::{
    filters::{dedupe_by_id, matches_query_constraints, within_radius},
    normalize::normalize_course,
    scoring::{calculate_fallback_score, score_breakdown, ScoringContext},
};
use crate::models::{
    CandidateQuery, GeoPoint, MatchPreferences, OriginSource, Profile, RadiusConstraint,
    RankingMode, ScoredCandidate, ScoringStrategy, ScoringWeights,
};

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
    pub mode: RankingMode,
    pub origin: OriginSource,
}

/// Main matching orchestrator - implements the filtering and ranking pipeline
///
/// # Pipeline Stages
/// 1. De-duplication by id and self exclusion
/// 2. Course, gender and bounding-box filtering
/// 3. Exact radius check
/// 4. Scoring and ranking
///
/// A `Matcher` holds configuration only; every call is a pure function of
/// its arguments.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    campus: Option<GeoPoint>,
    score_floor: Option<f64>,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            campus: None,
            score_floor: None,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Origin used for distances when the requester has no usable location
    pub fn with_campus(mut self, campus: Option<GeoPoint>) -> Self {
        self.campus = campus.filter(GeoPoint::is_finite);
        self
    }

    /// Drop candidates whose relevance (affinity plus availability) is at
    /// or below `floor`; being close or sharing a major alone never passes
    pub fn with_score_floor(mut self, floor: f64) -> Self {
        self.score_floor = Some(floor);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Resolve the distance origin: requester location, then campus default
    pub fn resolve_origin(&self, requester: Option<&Profile>) -> (Option<GeoPoint>, OriginSource) {
        if let Some(point) = requester.and_then(Profile::coordinates) {
            return (Some(point), OriginSource::Requester);
        }

        match self.campus {
            Some(campus) => (Some(campus), OriginSource::Campus),
            None => (None, OriginSource::Unresolved),
        }
    }

    /// Find matches for a requester
    ///
    /// # Arguments
    /// * `requester` - The profile searching, if known
    /// * `candidates` - The candidate pool; may contain the requester and duplicates
    /// * `preferences` - Hard constraints; `None` applies no filtering
    /// * `strategy` - How course affinity is scored
    /// * `limit` - Maximum number of matches to return
    ///
    /// # Returns
    /// MatchResult with candidates sorted by descending score, ties in input order
    pub fn find_matches(
        &self,
        requester: Option<&Profile>,
        candidates: &[Profile],
        preferences: Option<&MatchPreferences>,
        strategy: &ScoringStrategy,
        limit: Option<usize>,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let (origin, origin_source) = self.resolve_origin(requester);

        let radius_km = preferences.and_then(MatchPreferences::radius_km);
        if radius_km.is_some() && origin.is_none() {
            tracing::warn!("Radius filter requested but no origin coordinate resolved, skipping it");
        }

        let query = CandidateQuery {
            exclude_id: requester.map(|r| r.id.clone()),
            course: preferences
                .and_then(MatchPreferences::course_filter)
                .map(normalize_course),
            gender: preferences.and_then(MatchPreferences::gender_filter),
            radius: origin
                .zip(radius_km)
                .map(|(point, km)| RadiusConstraint::new(point, km)),
        };

        let context = ScoringContext::new(requester, strategy);

        let mut scored: Vec<ScoredCandidate> = dedupe_by_id(candidates)
            .into_iter()
            // Stage 1 & 2: identity, course, gender, bounding box
            .filter(|profile| matches_query_constraints(profile, &query))
            .filter_map(|profile| {
                let distance_km = origin.and_then(|o| {
                    profile.coordinates().and_then(|point| o.distance_km(&point))
                });

                // Stage 3: exact radius
                if let Some(radius) = &query.radius {
                    if !within_radius(distance_km, radius) {
                        return None;
                    }
                }

                // Stage 4: scoring
                let breakdown = score_breakdown(&context, profile, distance_km, &self.weights);
                if self.score_floor.is_some_and(|floor| breakdown.relevance() <= floor) {
                    return None;
                }
                let score = breakdown.total();

                Some(ScoredCandidate {
                    profile: profile.clone(),
                    distance_km,
                    score,
                })
            })
            .collect();

        rank(&mut scored, limit);

        MatchResult {
            matches: scored,
            total_candidates,
            mode: RankingMode::Primary,
            origin: origin_source,
        }
    }

    /// Demo ranking over the unfiltered pool
    ///
    /// Only de-duplication and self exclusion apply. Scores come from the
    /// compatibility signal plus a major bonus and are on a different scale
    /// from primary scores; the result is flagged `RankingMode::Fallback`.
    pub fn rank_fallback(
        &self,
        requester: Option<&Profile>,
        candidates: &[Profile],
        limit: Option<usize>,
    ) -> MatchResult {
        let (origin, origin_source) = self.resolve_origin(requester);
        let exclude_id = requester.map(|r| &r.id);

        let mut scored: Vec<ScoredCandidate> = dedupe_by_id(candidates)
            .into_iter()
            .filter(|profile| exclude_id != Some(&profile.id))
            .map(|profile| ScoredCandidate {
                profile: profile.clone(),
                distance_km: origin.and_then(|o| {
                    profile.coordinates().and_then(|point| o.distance_km(&point))
                }),
                score: calculate_fallback_score(requester, profile, &self.weights),
            })
            .collect();

        rank(&mut scored, limit);

        MatchResult {
            matches: scored,
            total_candidates: candidates.len(),
            mode: RankingMode::Fallback,
            origin: origin_source,
        }
    }

    /// Primary pass, falling back to demo ranking only when it comes back empty
    pub fn find_matches_or_fallback(
        &self,
        requester: Option<&Profile>,
        candidates: &[Profile],
        preferences: Option<&MatchPreferences>,
        strategy: &ScoringStrategy,
        limit: Option<usize>,
    ) -> MatchResult {
        let primary = self.find_matches(requester, candidates, preferences, strategy, limit);
        if !primary.matches.is_empty() {
            return primary;
        }

        tracing::debug!(
            "Primary ranking empty for {} candidates, using fallback ranking",
            candidates.len()
        );
        self.rank_fallback(requester, candidates, limit)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Sort by score (descending); the sort is stable so equal scores keep input order
fn rank(scored: &mut Vec<ScoredCandidate>, limit: Option<usize>) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(limit) = limit {
        scored.truncate(limit);
    }
}
