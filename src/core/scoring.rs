use std::collections::HashSet;

use crate::core::normalize::{eq_ignore_case_nonempty, normalize_course, normalized_course_set};
use crate::models::{Profile, ScoringStrategy, ScoringWeights};

/// Compatibility assumed for candidates that carry none
const DEFAULT_COMPATIBILITY: u8 = 80;

/// Requester-side signals, normalized once per matching call
#[derive(Debug, Clone, Default)]
pub struct ScoringContext<'a> {
    affinity: Affinity,
    major: Option<&'a str>,
    availability: Option<&'a str>,
}

#[derive(Debug, Clone)]
enum Affinity {
    Courses(HashSet<String>),
    Tokens(Vec<String>),
}

impl Default for Affinity {
    fn default() -> Self {
        Affinity::Courses(HashSet::new())
    }
}

impl<'a> ScoringContext<'a> {
    pub fn new(requester: Option<&'a Profile>, strategy: &ScoringStrategy) -> Self {
        let affinity = match strategy {
            ScoringStrategy::ByCourseCode => Affinity::Courses(
                requester
                    .map(|r| normalized_course_set(&r.courses))
                    .unwrap_or_default(),
            ),
            ScoringStrategy::ByExtractedToken(tokens) => {
                let mut seen = HashSet::new();
                Affinity::Tokens(
                    tokens
                        .iter()
                        .map(|t| normalize_course(t))
                        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
                        .collect(),
                )
            }
        };

        Self {
            affinity,
            major: requester.and_then(|r| r.major.as_deref()),
            availability: requester.and_then(|r| r.availability.as_deref()),
        }
    }
}

/// Per-candidate score contributions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Course overlap or extracted-token overlap
    pub affinity: f64,
    pub major: f64,
    pub availability: f64,
    pub proximity: f64,
}

impl ScoreBreakdown {
    /// Sum of all contributions, never negative
    pub fn total(&self) -> f64 {
        (self.affinity + self.major + self.availability + self.proximity).max(0.0)
    }

    /// What the candidate shares with the requester in study terms: affinity
    /// plus availability. Major and proximity are left out.
    pub fn relevance(&self) -> f64 {
        self.affinity + self.availability
    }
}

/// Break a candidate's score into its independent contributions
pub fn score_breakdown(
    context: &ScoringContext<'_>,
    candidate: &Profile,
    distance_km: Option<f64>,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let affinity = match &context.affinity {
        Affinity::Courses(courses) => course_overlap_score(courses, candidate, weights),
        Affinity::Tokens(tokens) => token_overlap_score(tokens, candidate, weights),
    };

    let major = if eq_ignore_case_nonempty(context.major, candidate.major.as_deref()) {
        weights.major
    } else {
        0.0
    };

    let availability = if eq_ignore_case_nonempty(
        context.availability,
        candidate.availability.as_deref(),
    ) {
        weights.availability
    } else {
        0.0
    };

    let proximity = distance_km
        .map(|d| proximity_score(d, weights))
        .unwrap_or(0.0);

    ScoreBreakdown {
        affinity,
        major,
        availability,
        proximity,
    }
}

/// Calculate a candidate's score from independent contributions
///
/// score = affinity          # course overlap OR extracted-token overlap
///       + major_bonus       # same major
///       + availability_bonus
///       + proximity_bonus   # linear decay with distance, floored at zero
///
/// The result is never negative.
pub fn calculate_match_score(
    context: &ScoringContext<'_>,
    candidate: &Profile,
    distance_km: Option<f64>,
    weights: &ScoringWeights,
) -> f64 {
    score_breakdown(context, candidate, distance_km, weights).total()
}

/// Number of normalized course codes shared with the candidate
pub fn count_shared_courses(requester_courses: &HashSet<String>, candidate: &Profile) -> usize {
    normalized_course_set(&candidate.courses)
        .intersection(requester_courses)
        .count()
}

#[inline]
fn course_overlap_score(
    requester_courses: &HashSet<String>,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> f64 {
    if requester_courses.is_empty() {
        return 0.0;
    }

    count_shared_courses(requester_courses, candidate) as f64 * weights.course_overlap
}

/// Tokens contained in a candidate course earn `token_substring`; tokens of
/// at least `token_prefix_min_len` characters that start a course earn
/// `token_prefix` on top.
fn token_overlap_score(tokens: &[String], candidate: &Profile, weights: &ScoringWeights) -> f64 {
    let courses: Vec<String> = candidate
        .courses
        .iter()
        .map(|c| normalize_course(c))
        .filter(|c| !c.is_empty())
        .collect();

    if courses.is_empty() {
        return 0.0;
    }

    tokens
        .iter()
        .map(|token| {
            let mut score = 0.0;
            if courses.iter().any(|c| c.contains(token.as_str())) {
                score += weights.token_substring;
            }
            if token.chars().count() >= weights.token_prefix_min_len
                && courses.iter().any(|c| c.starts_with(token.as_str()))
            {
                score += weights.token_prefix;
            }
            score
        })
        .sum()
}

/// Proximity bonus: `max(0, cap - min(cap, distance * factor))`
#[inline]
pub fn proximity_score(distance_km: f64, weights: &ScoringWeights) -> f64 {
    if !distance_km.is_finite() {
        return 0.0;
    }

    let cap = weights.proximity_cap;
    (cap - (distance_km * weights.proximity_km_factor).min(cap)).max(0.0)
}

/// Coarse demo-ranking score used only by the fallback pass
///
/// `compatibility / 5` (compatibility defaults to 80) plus the major bonus.
pub fn calculate_fallback_score(
    requester: Option<&Profile>,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> f64 {
    let compatibility = candidate.compatibility.unwrap_or(DEFAULT_COMPATIBILITY) as f64;
    let mut score = compatibility / 5.0;

    let requester_major = requester.and_then(|r| r.major.as_deref());
    if eq_ignore_case_nonempty(requester_major, candidate.major.as_deref()) {
        score += weights.major;
    }

    score.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_profile(courses: &[&str], major: Option<&str>, availability: Option<&str>) -> Profile {
        let mut profile = Profile::new("test_user");
        profile.courses = courses.iter().map(|c| c.to_string()).collect();
        profile.major = major.map(str::to_string);
        profile.availability = availability.map(str::to_string);
        profile
    }

    #[test]
    fn test_course_overlap_score() {
        let requester = create_test_profile(&["CS 106B", "MATH 51"], None, None);
        let candidate = create_test_profile(&["cs106b", "MATH 51", "PHYSICS 21"], None, None);
        let weights = ScoringWeights::discovery();
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        let score = calculate_match_score(&context, &candidate, None, &weights);
        assert_eq!(score, 60.0);
    }

    #[test]
    fn test_duplicate_courses_count_once() {
        let requester = create_test_profile(&["CS 106B", "cs 106b"], None, None);
        let candidate = create_test_profile(&["CS 106B", "CS106B"], None, None);
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        let score = calculate_match_score(&context, &candidate, None, &ScoringWeights::instant());
        assert_eq!(score, 40.0);
    }

    #[test]
    fn test_major_and_availability_bonus() {
        let requester = create_test_profile(&[], Some("Physics"), Some("Evenings"));
        let candidate = create_test_profile(&[], Some("physics"), Some("EVENINGS"));
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        let score = calculate_match_score(&context, &candidate, None, &ScoringWeights::discovery());
        assert_eq!(score, 30.0);
    }

    #[test]
    fn test_empty_major_never_matches() {
        let requester = create_test_profile(&[], Some(""), None);
        let candidate = create_test_profile(&[], Some(""), None);
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        assert_eq!(calculate_match_score(&context, &candidate, None, &ScoringWeights::default()), 0.0);
    }

    #[test]
    fn test_token_overlap_score() {
        let candidate = create_test_profile(&["CSE 230", "BIO 340"], None, None);
        let strategy = ScoringStrategy::ByExtractedToken(vec![
            "cse".to_string(),    // substring + prefix
            "230".to_string(),    // substring only
            "cs".to_string(),     // substring, too short for prefix
            "  ".to_string(),     // ignored
            "CSE".to_string(),    // duplicate of the first
        ]);
        let context = ScoringContext::new(None, &strategy);

        let score = calculate_match_score(&context, &candidate, None, &ScoringWeights::instant());
        assert_eq!(score, 60.0 + 40.0 + 40.0);
    }

    #[test]
    fn test_token_mode_ignores_literal_courses() {
        let requester = create_test_profile(&["CS 106B"], None, None);
        let candidate = create_test_profile(&["CS 106B"], None, None);
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByExtractedToken(vec![]));

        assert_eq!(calculate_match_score(&context, &candidate, None, &ScoringWeights::instant()), 0.0);
    }

    #[test]
    fn test_proximity_score() {
        let weights = ScoringWeights::discovery();

        assert_eq!(proximity_score(0.0, &weights), 30.0);
        assert!((proximity_score(1.0, &weights) - 20.0).abs() < 1e-9);
        assert_eq!(proximity_score(3.0, &weights), 0.0);
        assert_eq!(proximity_score(100.0, &weights), 0.0);
        assert_eq!(proximity_score(f64::NAN, &weights), 0.0);
    }

    #[test]
    fn test_score_never_negative() {
        let weights = ScoringWeights {
            major: -50.0,
            ..ScoringWeights::discovery()
        };
        let requester = create_test_profile(&[], Some("Math"), None);
        let candidate = create_test_profile(&[], Some("Math"), None);
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        assert_eq!(calculate_match_score(&context, &candidate, Some(0.5), &weights), 0.0);
    }

    #[test]
    fn test_relevance_excludes_major_and_proximity() {
        let mut requester = create_test_profile(&[], Some("Math"), Some("Evenings"));
        requester.courses = vec!["MATH 51".to_string()];
        let candidate = create_test_profile(&["MATH 51"], Some("math"), Some("evenings"));
        let context = ScoringContext::new(Some(&requester), &ScoringStrategy::ByCourseCode);

        let breakdown = score_breakdown(&context, &candidate, Some(0.0), &ScoringWeights::instant());
        assert_eq!(breakdown.relevance(), 50.0);
        assert_eq!(breakdown.total(), 100.0);

        let stranger = create_test_profile(&["HIST 10"], Some("Math"), None);
        let nearby = score_breakdown(&context, &stranger, Some(0.1), &ScoringWeights::instant());
        assert_eq!(nearby.relevance(), 0.0);
        assert!(nearby.total() > 0.0);
    }

    #[test]
    fn test_fallback_score() {
        let requester = create_test_profile(&[], Some("Biology"), None);
        let mut candidate = create_test_profile(&[], Some("biology"), None);
        let weights = ScoringWeights::instant();

        assert_eq!(calculate_fallback_score(Some(&requester), &candidate, &weights), 36.0);

        candidate.compatibility = Some(95);
        candidate.major = None;
        assert_eq!(calculate_fallback_score(Some(&requester), &candidate, &weights), 19.0);
    }
}
