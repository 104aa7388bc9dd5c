// Unit tests for Study Match

use study_match::core::{
    distance::{haversine_distance, calculate_bounding_box, is_within_bounding_box, miles_to_km},
    filters::{dedupe_by_id, matches_query_constraints, within_radius},
    normalize::{normalize_course, normalized_course_set},
    scoring::{calculate_fallback_score, calculate_match_score, proximity_score, ScoringContext},
};
use study_match::models::{
    CandidateQuery, GeoPoint, MatchPreferences, Profile, RadiusConstraint, ScoringStrategy,
    ScoringWeights,
};

fn create_profile(id: &str, courses: &[&str]) -> Profile {
    let mut profile = Profile::new(id);
    profile.courses = courses.iter().map(|c| c.to_string()).collect();
    profile
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(37.4275, -122.1697, 37.4275, -122.1697);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_stanford_to_berkeley() {
    // Roughly 55-60 km across the bay
    let distance = haversine_distance(37.4275, -122.1697, 37.8719, -122.2585);
    assert!(distance > 45.0 && distance < 60.0);
}

#[test]
fn test_haversine_is_symmetric() {
    let there = haversine_distance(37.4275, -122.1697, 40.7128, -74.0060);
    let back = haversine_distance(40.7128, -74.0060, 37.4275, -122.1697);
    assert!((there - back).abs() < 1e-9);
}

#[test]
fn test_bounding_box_creation() {
    let bbox = calculate_bounding_box(37.4275, -122.1697, 10.0);

    assert!(bbox.min_lat < 37.4275);
    assert!(bbox.max_lat > 37.4275);
    assert!(bbox.min_lon < -122.1697);
    assert!(bbox.max_lon > -122.1697);

    // Roughly 0.18 degrees of latitude (10km / 111km per degree, both sides)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);
}

#[test]
fn test_point_within_bbox() {
    let bbox = calculate_bounding_box(37.4275, -122.1697, 10.0);

    assert!(is_within_bounding_box(37.4275, -122.1697, &bbox));
    assert!(is_within_bounding_box(37.43, -122.17, &bbox));
    assert!(!is_within_bounding_box(40.7128, -74.0060, &bbox));
    assert!(!is_within_bounding_box(bbox.max_lat + 0.01, -122.1697, &bbox));
}

#[test]
fn test_polar_bbox_is_not_used() {
    let constraint = RadiusConstraint::new(GeoPoint::new(89.99, 0.0), 50.0);
    assert!(constraint.bounding_box.is_none());

    let local = RadiusConstraint::new(GeoPoint::new(37.4275, -122.1697), 5.0);
    assert!(local.bounding_box.is_some());
}

#[test]
fn test_miles_to_km() {
    assert!((miles_to_km(1.0) - 1.60934).abs() < 1e-9);
    assert!((miles_to_km(5.0) - 8.0467).abs() < 1e-4);
}

#[test]
fn test_course_normalization() {
    assert_eq!(normalize_course(" cs 106b "), "CS106B");
    assert_eq!(normalize_course("Math\t51"), "MATH51");

    let set = normalized_course_set(&["CS 106B", "cs106b", "  "]);
    assert_eq!(set.len(), 1);
    assert!(set.contains("CS106B"));
}

#[test]
fn test_dedupe_keeps_first() {
    let mut first = create_profile("a", &["CS 106B"]);
    first.name = Some("First".to_string());
    let mut second = create_profile("a", &[]);
    second.name = Some("Second".to_string());
    let pool = vec![first, create_profile("b", &[]), second];

    let unique = dedupe_by_id(&pool);

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].name.as_deref(), Some("First"));
}

#[test]
fn test_query_requires_location_for_radius() {
    let query = CandidateQuery {
        radius: Some(RadiusConstraint::new(GeoPoint::new(37.4275, -122.1697), 5.0)),
        ..Default::default()
    };

    let mut nowhere = create_profile("a", &[]);
    nowhere.location = Some(GeoPoint::new(f64::NAN, -122.17));
    assert!(!matches_query_constraints(&nowhere, &query));

    let mut near = create_profile("b", &[]);
    near.location = Some(GeoPoint::new(37.43, -122.17));
    assert!(matches_query_constraints(&near, &query));
}

#[test]
fn test_radius_boundary_is_inclusive() {
    let constraint = RadiusConstraint::new(GeoPoint::new(37.4275, -122.1697), 2.0);

    assert!(within_radius(Some(2.0), &constraint));
    assert!(!within_radius(Some(2.0001), &constraint));
    assert!(!within_radius(None, &constraint));
}

#[test]
fn test_preferences_radius_resolution() {
    let km_wins = MatchPreferences {
        radius_km: Some(3.0),
        radius_miles: Some(10.0),
        ..Default::default()
    };
    assert_eq!(km_wins.radius_km(), Some(3.0));

    let disabled = MatchPreferences {
        radius_km: Some(0.0),
        ..Default::default()
    };
    assert_eq!(disabled.radius_km(), None);
}

#[test]
fn test_match_score_components() {
    let weights = ScoringWeights::discovery();

    let mut requester = create_profile("me", &["CS 106B", "MATH 51"]);
    requester.major = Some("Computer Science".to_string());
    requester.availability = Some("Evenings".to_string());

    let mut candidate = create_profile("a", &["cs106b", "MATH 51", "PHYSICS 21"]);
    candidate.major = Some("computer science".to_string());
    candidate.availability = Some("evenings".to_string());

    let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

    // 2 shared courses * 30 + major 20 + availability 10
    assert_eq!(calculate_match_score(&context, &candidate, None, &weights), 90.0);
    // plus full proximity bonus at zero distance
    assert_eq!(calculate_match_score(&context, &candidate, Some(0.0), &weights), 120.0);
}

#[test]
fn test_instant_token_score() {
    let weights = ScoringWeights::instant();
    let candidate = create_profile("a", &["CSE 230", "BIO 340"]);
    let strategy = ScoringStrategy::ByExtractedToken(vec!["CSE".to_string(), "BIO340".to_string()]);
    let context = ScoringContext::new(None, &strategy);

    // CSE: substring 40 + prefix 20; BIO340: substring 40 + prefix 20
    assert_eq!(calculate_match_score(&context, &candidate, None, &weights), 120.0);
}

#[test]
fn test_proximity_decay() {
    let discovery = ScoringWeights::discovery();
    let instant = ScoringWeights::instant();

    assert_eq!(proximity_score(0.0, &discovery), 30.0);
    assert!((proximity_score(1.5, &discovery) - 15.0).abs() < 1e-9);
    assert_eq!(proximity_score(3.0, &discovery), 0.0);
    assert_eq!(proximity_score(50.0, &discovery), 0.0);
    assert!((proximity_score(1.0, &instant) - 24.0).abs() < 1e-9);
}

#[test]
fn test_fallback_score() {
    let weights = ScoringWeights::discovery();
    let mut requester = create_profile("me", &[]);
    requester.major = Some("Biology".to_string());

    let mut candidate = create_profile("a", &[]);
    candidate.compatibility = Some(95);
    candidate.major = Some("BIOLOGY".to_string());

    assert_eq!(calculate_fallback_score(Some(&requester), &candidate, &weights), 39.0);
    assert_eq!(calculate_fallback_score(None, &create_profile("b", &[]), &weights), 16.0);
}
