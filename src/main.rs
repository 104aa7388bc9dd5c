use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use std::sync::Arc;
use std::time::Duration;
use study_match::config::{LogFormat, LoggingSettings, Settings};
use study_match::models::WeightPreset;
use study_match::routes::{self, AppState};
use study_match::services::{Roster, TokenCache, TokenExtractor};
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Install the global tracing subscriber from logging settings
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.log_format() {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Text => subscriber.init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration, then initialize logging from it (env vars win)
    let loaded = Settings::load();
    let logging = loaded
        .as_ref()
        .map(|settings| settings.logging.clone())
        .unwrap_or_default()
        .with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok());
    init_tracing(&logging);

    info!("Starting Study Match service...");

    let settings = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // Load the candidate roster (optional - requests may carry their own pool)
    let roster = match Roster::load(&settings.roster.path) {
        Ok(roster) => {
            info!("Roster loaded: {} profiles from {}", roster.len(), settings.roster.path);
            roster
        }
        Err(e) => {
            error!("Failed to load roster from {} ({}), starting with an empty roster", settings.roster.path, e);
            Roster::empty()
        }
    };

    // Initialize token cache and extractor
    let cache_size = settings.extractor.cache_size.unwrap_or(1000);
    let cache_ttl = settings.extractor.cache_ttl_secs.unwrap_or(600);
    let timeout = Duration::from_secs(settings.extractor.timeout_secs.unwrap_or(20));

    let extractor = TokenExtractor::new(
        settings.extractor.endpoint.clone(),
        settings.extractor.model.clone(),
        timeout,
        TokenCache::new(cache_size, cache_ttl),
    )
    .map_err(|e| {
        error!("Failed to build token extractor client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    if extractor.is_remote() {
        info!("Token extractor initialized (cache: {} entries, TTL: {}s)", cache_size, cache_ttl);
    } else {
        warn!("No extractor endpoint configured, using local token extraction only");
    }

    let campus = settings.matching.campus();
    if campus.is_none() {
        warn!("No campus coordinate configured, requesters without a location skip radius filtering");
    }

    // Build application state
    let app_state = AppState {
        roster: Arc::new(roster),
        extractor: Arc::new(extractor),
        scoring: settings.scoring.clone(),
        campus,
        max_limit: settings.matching.limit_cap(),
    };

    info!(
        "Scoring weights: discovery {:?}, instant {:?}",
        app_state.scoring.weights(WeightPreset::Discovery),
        app_state.scoring.weights(WeightPreset::Instant)
    );

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
