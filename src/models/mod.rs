// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CandidateQuery, GeoPoint, MatchPreferences, OriginSource, Profile, ProfileId,
    RadiusConstraint, RankingMode, ScoredCandidate, ScoringStrategy, ScoringWeights, WeightPreset,
};
pub use requests::{ExtractTokensRequest, FindMatchesRequest, InstantMatchRequest};
pub use responses::{
    ErrorResponse, ExtractTokensResponse, FindMatchesResponse, HealthResponse, InstantMatchResponse,
};
