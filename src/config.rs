use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{GeoPoint, ScoringWeights, WeightPreset};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub extractor: ExtractorSettings,
    #[serde(default)]
    pub roster: RosterSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractorSettings {
    /// Base URL of the token extraction service; unset runs fallback-only
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cache_size: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterSettings {
    #[serde(default = "default_roster_path")]
    pub path: String,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self { path: default_roster_path() }
    }
}

fn default_roster_path() -> String { "data/students.json".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    /// Distance origin used when the requester has no location
    pub campus_latitude: Option<f64>,
    pub campus_longitude: Option<f64>,
    pub max_limit: Option<u16>,
}

/// Hard ceiling on results per request, matching request validation
pub const MAX_RESULT_LIMIT: u16 = 100;

impl MatchingSettings {
    /// Configured result cap, clamped to `1..=MAX_RESULT_LIMIT`
    pub fn limit_cap(&self) -> u16 {
        self.max_limit
            .unwrap_or(MAX_RESULT_LIMIT)
            .clamp(1, MAX_RESULT_LIMIT)
    }

    pub fn campus(&self) -> Option<GeoPoint> {
        match (self.campus_latitude, self.campus_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_finite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub discovery: WeightsConfig,
    #[serde(default)]
    pub instant: WeightsConfig,
}

impl ScoringSettings {
    pub fn weights(&self, preset: WeightPreset) -> ScoringWeights {
        match preset {
            WeightPreset::Discovery => self.discovery.to_weights(ScoringWeights::discovery()),
            WeightPreset::Instant => self.instant.to_weights(ScoringWeights::instant()),
        }
    }
}

/// Per-preset overrides; unset fields keep the preset's value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightsConfig {
    pub course_overlap: Option<f64>,
    pub token_substring: Option<f64>,
    pub token_prefix: Option<f64>,
    pub token_prefix_min_len: Option<usize>,
    pub major: Option<f64>,
    pub availability: Option<f64>,
    pub proximity_cap: Option<f64>,
    pub proximity_km_factor: Option<f64>,
}

impl WeightsConfig {
    fn to_weights(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            course_overlap: self.course_overlap.unwrap_or(base.course_overlap),
            token_substring: self.token_substring.unwrap_or(base.token_substring),
            token_prefix: self.token_prefix.unwrap_or(base.token_prefix),
            token_prefix_min_len: self.token_prefix_min_len.unwrap_or(base.token_prefix_min_len),
            major: self.major.unwrap_or(base.major),
            availability: self.availability.unwrap_or(base.availability),
            proximity_cap: self.proximity_cap.unwrap_or(base.proximity_cap),
            proximity_km_factor: self.proximity_km_factor.unwrap_or(base.proximity_km_factor),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Text,
}

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` style overrides on top of the file values
    pub fn with_overrides(mut self, level: Option<String>, format: Option<String>) -> Self {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            self.format = format;
        }
        self
    }

    /// Parsed format; unknown values fall back to plain text
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Text,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with STUDYMATCH)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STUDYMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STUDYMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("STUDYMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the short-form environment overrides shared with the web client:
/// `EXTRACTOR_URL` for the extractor endpoint and `GEMINI_MODEL` for the model.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(endpoint) = env::var("EXTRACTOR_URL") {
        builder = builder.set_override("extractor.endpoint", endpoint)?;
    }
    if let Ok(model) = env::var("GEMINI_MODEL") {
        builder = builder.set_override("extractor.model", model)?;
    }

    builder.build()
}
