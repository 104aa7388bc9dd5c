use std::collections::HashSet;

use crate::core::distance::{calculate_bounding_box, is_within_bounding_box};
use crate::core::normalize::normalize_course;
use crate::models::{CandidateQuery, GeoPoint, Profile, ProfileId, RadiusConstraint};

/// Drop later duplicates by id, keeping the first occurrence and input order
pub fn dedupe_by_id(candidates: &[Profile]) -> Vec<&Profile> {
    let mut seen: HashSet<&ProfileId> = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .filter(|profile| seen.insert(&profile.id))
        .collect()
}

impl RadiusConstraint {
    pub fn new(origin: GeoPoint, radius_km: f64) -> Self {
        let bbox = calculate_bounding_box(origin.latitude, origin.longitude, radius_km);

        Self {
            origin,
            radius_km,
            bounding_box: (!bbox.wraps()).then_some(bbox),
        }
    }
}

/// Candidate takes the required course (`course` already normalized)
#[inline]
pub fn matches_course(profile: &Profile, course: &str) -> bool {
    profile
        .courses
        .iter()
        .any(|c| normalize_course(c) == course)
}

/// Candidate gender equals the lowercased preference
///
/// The candidate value is trimmed and lowercased before comparison.
#[inline]
pub fn matches_gender(profile: &Profile, gender: &str) -> bool {
    profile
        .gender
        .as_deref()
        .map(|g| g.trim().to_lowercase() == gender)
        .unwrap_or(false)
}

/// Check if a profile passes the hard constraints of a query
///
/// The radius part is only the bounding-box pre-check; the exact great-circle
/// check happens once the distance is computed for scoring.
#[inline]
pub fn matches_query_constraints(profile: &Profile, query: &CandidateQuery) -> bool {
    if query.exclude_id.as_ref() == Some(&profile.id) {
        return false;
    }

    if let Some(course) = &query.course {
        if !matches_course(profile, course) {
            return false;
        }
    }

    if let Some(gender) = &query.gender {
        if !matches_gender(profile, gender) {
            return false;
        }
    }

    if let Some(radius) = &query.radius {
        // Unknown location cannot satisfy an active radius filter
        let Some(point) = profile.coordinates() else {
            return false;
        };

        if let Some(bbox) = &radius.bounding_box {
            if !is_within_bounding_box(point.latitude, point.longitude, bbox) {
                return false;
            }
        }
    }

    true
}

/// Exact radius check on an already computed distance
#[inline]
pub fn within_radius(distance_km: Option<f64>, radius: &RadiusConstraint) -> bool {
    distance_km.map(|d| d <= radius.radius_km).unwrap_or(false)
}
