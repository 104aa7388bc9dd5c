//! Study Match - study-partner matching service
//!
//! This library provides the filtering, scoring and ranking pipeline that
//! pairs a requesting student with nearby classmates, plus the token
//! extraction and roster services the HTTP layer builds on.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{Matcher, MatchResult, distance::{haversine_distance, calculate_bounding_box}};
pub use models::{
    GeoPoint, MatchPreferences, Profile, ProfileId, RankingMode, ScoredCandidate, ScoringStrategy,
    ScoringWeights, FindMatchesRequest, FindMatchesResponse,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bbox = calculate_bounding_box(37.4275, -122.1697, 10.0);
        assert!(bbox.min_lat < 37.4275);

        let result = Matcher::default().find_matches(None, &[], None, &ScoringStrategy::default(), None);
        assert!(result.matches.is_empty());
    }
}
