use std::collections::HashSet;

/// Canonical form of a course code or token: uppercase, all whitespace removed.
///
/// `"cs 106b"`, `"CS106B"` and `" CS  106B "` all normalize to `"CS106B"`.
#[inline]
pub fn normalize_course(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Set of non-empty normalized course codes
pub fn normalized_course_set<S: AsRef<str>>(courses: &[S]) -> HashSet<String> {
    courses
        .iter()
        .map(|c| normalize_course(c.as_ref()))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Both values present and non-blank, and equal ignoring case
pub fn eq_ignore_case_nonempty(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(str::trim), b.map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            a.to_lowercase() == b.to_lowercase()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_course() {
        assert_eq!(normalize_course("cs 106b"), "CS106B");
        assert_eq!(normalize_course(" CS\t106B "), "CS106B");
        assert_eq!(normalize_course("   "), "");
    }

    #[test]
    fn test_course_set_dedupes() {
        let set = normalized_course_set(&["CS 106B", "cs106b", "", "MATH 51"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("MATH51"));
    }

    #[test]
    fn test_eq_ignore_case_nonempty() {
        assert!(eq_ignore_case_nonempty(Some("Computer Science"), Some("computer science")));
        assert!(!eq_ignore_case_nonempty(Some(""), Some("")));
        assert!(!eq_ignore_case_nonempty(None, Some("Physics")));
        assert!(!eq_ignore_case_nonempty(Some("Physics"), Some("Biology")));
    }
}
