use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Profile;
use crate::services::cache::{CacheKey, TokenCache};

/// Errors that can occur when calling the token extractor
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Extractor returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Extractor endpoint not configured")]
    NotConfigured,
}

/// Where a token list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Remote,
    Fallback,
}

/// Tokens plus their provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub tokens: Vec<String>,
    pub source: TokenSource,
}

#[derive(Debug, Serialize)]
struct ExtractPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ExtractProfile<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ExtractProfile<'a> {
    courses: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    major: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ExtractReply {
    #[serde(default)]
    tokens: Vec<serde_json::Value>,
}

lazy_static! {
    // Course codes like "CSE230", "CSE 230", "BIO-340"
    static ref COURSE_CODE_RE: Regex = Regex::new(r"\b([A-Z]{2,4})\s?-?\s?(\d{2,3})\b").unwrap();
    // Bare subject abbreviations and names
    static ref SUBJECT_RE: Regex = Regex::new(
        r"\b(BIO|BIOL|BIOLOGY|ECN|ECON|ECONOMICS|CSE|CS|EE|EEE|MAT|MATH|PSY|PSYCH)\b"
    )
    .unwrap();
}

/// Flatten the parts of a profile the extractor reads into one text
pub fn profile_text(profile: &Profile) -> String {
    let mut parts = Vec::new();

    if let Some(major) = profile.major.as_deref().filter(|m| !m.trim().is_empty()) {
        parts.push(format!("MAJOR: {}", major));
    }
    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        parts.push(format!("BIO: {}", bio));
    }
    if !profile.courses.is_empty() {
        parts.push(format!("COURSES: {}", profile.courses.join(", ")));
    }

    parts.join("\n")
}

/// Local regex extraction used when the remote extractor is unavailable
///
/// Every course code yields `"SUBJ NUM"`, `"SUBJNUM"` and `"SUBJ"`; known
/// subject words are added as-is. Output is sorted and unique.
pub fn fallback_tokens(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let upper = text.to_uppercase();
    let mut tokens = BTreeSet::new();

    for caps in COURSE_CODE_RE.captures_iter(&upper) {
        let subject = &caps[1];
        let number = &caps[2];
        tokens.insert(format!("{} {}", subject, number));
        tokens.insert(format!("{}{}", subject, number));
        tokens.insert(subject.to_string());
    }

    for caps in SUBJECT_RE.captures_iter(&upper) {
        tokens.insert(caps[1].to_string());
    }

    tokens.into_iter().collect()
}

/// Trim and uppercase tokens, dropping blanks and repeats (first wins)
pub fn normalize_tokens<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Client for the external course/subject token extractor
///
/// Any failure of the remote call degrades to [`fallback_tokens`]; callers
/// always get a token list.
pub struct TokenExtractor {
    endpoint: Option<String>,
    model: Option<String>,
    client: Client,
    cache: TokenCache,
}

impl TokenExtractor {
    /// Create a new extractor; `endpoint = None` runs fallback-only
    pub fn new(
        endpoint: Option<String>,
        model: Option<String>,
        timeout: Duration,
        cache: TokenCache,
    ) -> Result<Self, ExtractorError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            model: model.filter(|m| !m.trim().is_empty()),
            client,
            cache,
        })
    }

    pub fn is_remote(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Extract tokens from a profile's major, bio and courses
    pub async fn extract_profile(&self, profile: &Profile) -> Extraction {
        let text = profile_text(profile);
        let payload = ExtractPayload {
            profile: Some(ExtractProfile {
                courses: &profile.courses,
                bio: profile.bio.as_deref(),
                major: profile.major.as_deref(),
            }),
            text: None,
            model: self.model.as_deref(),
        };

        self.extract_with(&text, &payload).await
    }

    /// Extract tokens from free text
    pub async fn extract_text(&self, text: &str) -> Extraction {
        let payload = ExtractPayload {
            profile: None,
            text: Some(text),
            model: self.model.as_deref(),
        };

        self.extract_with(text, &payload).await
    }

    async fn extract_with(&self, text: &str, payload: &ExtractPayload<'_>) -> Extraction {
        if self.endpoint.is_none() {
            return Extraction {
                tokens: fallback_tokens(text),
                source: TokenSource::Fallback,
            };
        }

        let key = CacheKey::tokens(text);
        if let Some(tokens) = self.cache.get(&key).await {
            return Extraction {
                tokens,
                source: TokenSource::Remote,
            };
        }

        match self.request_tokens(payload).await {
            Ok(tokens) if !tokens.is_empty() => {
                self.cache.set(&key, tokens.clone()).await;
                Extraction {
                    tokens,
                    source: TokenSource::Remote,
                }
            }
            Ok(_) => {
                tracing::debug!("Extractor returned no tokens, using fallback extraction");
                Extraction {
                    tokens: fallback_tokens(text),
                    source: TokenSource::Fallback,
                }
            }
            Err(e) => {
                tracing::warn!("Token extractor failed, using fallback extraction: {}", e);
                Extraction {
                    tokens: fallback_tokens(text),
                    source: TokenSource::Fallback,
                }
            }
        }
    }

    async fn request_tokens(&self, payload: &ExtractPayload<'_>) -> Result<Vec<String>, ExtractorError> {
        let endpoint = self.endpoint.as_deref().ok_or(ExtractorError::NotConfigured)?;
        let url = format!("{}/ai/extract", endpoint.trim_end_matches('/'));

        tracing::debug!("Requesting tokens from: {}", url);

        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ExtractorError::ApiError(format!("{} - {}", status, body)));
        }

        let reply: ExtractReply = response
            .json()
            .await
            .map_err(|e| ExtractorError::InvalidResponse(e.to_string()))?;

        // Models occasionally return numbers or nulls in the list
        let raw = reply.tokens.into_iter().filter_map(|t| match t {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(normalize_tokens(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_tokens_course_codes() {
        let tokens = fallback_tokens("Taking cse230 and Bio-340 this term");

        assert_eq!(
            tokens,
            vec!["BIO", "BIO 340", "BIO340", "CSE", "CSE 230", "CSE230"]
        );
    }

    #[test]
    fn test_fallback_tokens_subjects() {
        let tokens = fallback_tokens("MAJOR: Economics, into psych and math");
        assert_eq!(tokens, vec!["ECONOMICS", "MATH", "PSYCH"]);
    }

    #[test]
    fn test_fallback_tokens_empty() {
        assert!(fallback_tokens("   ").is_empty());
        assert!(fallback_tokens("nothing relevant here").is_empty());
    }

    #[test]
    fn test_normalize_tokens() {
        let tokens = normalize_tokens(vec![" cse 230 ", "CSE 230", "", "bio"]);
        assert_eq!(tokens, vec!["CSE 230", "BIO"]);
    }

    #[test]
    fn test_profile_text() {
        let mut profile = Profile::new("u1");
        profile.major = Some("Biology".to_string());
        profile.courses = vec!["BIO 82".to_string(), "CHEM 33".to_string()];

        assert_eq!(profile_text(&profile), "MAJOR: Biology\nCOURSES: BIO 82, CHEM 33");
    }

    #[test]
    fn test_offline_extractor_uses_fallback() {
        let extractor =
            TokenExtractor::new(None, None, Duration::from_secs(1), TokenCache::new(10, 60)).unwrap();
        let mut profile = Profile::new("u1");
        profile.courses = vec!["CS 106B".to_string()];

        let extraction = tokio_test::block_on(extractor.extract_profile(&profile));

        assert!(!extractor.is_remote());
        assert_eq!(extraction.source, TokenSource::Fallback);
        assert!(extraction.tokens.contains(&"CS".to_string()));
    }
}
