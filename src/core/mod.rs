// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use distance::{haversine_distance, calculate_bounding_box, is_within_bounding_box, miles_to_km};
pub use filters::{dedupe_by_id, matches_query_constraints, within_radius};
pub use matcher::{Matcher, MatchResult};
pub use normalize::normalize_course;
pub use scoring::{calculate_match_score, calculate_fallback_score, score_breakdown, ScoreBreakdown, ScoringContext};
