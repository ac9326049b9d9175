// Numerology Engine - Web Server
// Local quick-number API with Axum (no remote calls)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use numerology_engine::{
    build_grid, parse_birth_date, ConfigOverrides, EngineConfig, Grid, NameMetrics,
    NumericProfile,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            warning: None,
        }
    }

    fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody {
    name: String,
    birth_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridBody {
    birth_date: String,
    #[serde(default)]
    fold: Option<u32>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

/// Dates that compute but aren't real calendar dates get flagged, not rejected
fn date_warning(date: &str) -> Option<String> {
    match parse_birth_date(date) {
        Some(_) => None,
        None => Some(format!("{:?} is not a valid calendar date", date)),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(numerology_engine::VERSION))
}

/// POST /api/profile - All local numbers for a name + birth date
async fn profile(Json(body): Json<ProfileBody>) -> impl IntoResponse {
    let profile = NumericProfile::compute(&body.name, &body.birth_date);
    let warning = date_warning(&body.birth_date);

    (StatusCode::OK, Json(ApiResponse::ok(profile).with_warning(warning)))
}

/// POST /api/grid - Digit grid, optionally with a folded number
async fn grid(Json(body): Json<GridBody>) -> impl IntoResponse {
    let grid: Grid = build_grid(&body.birth_date, body.fold);
    let warning = date_warning(&body.birth_date);

    (StatusCode::OK, Json(ApiResponse::ok(grid).with_warning(warning)))
}

/// POST /api/name-metrics - Expression, soul urge, personality
async fn name_metrics(Json(body): Json<NameBody>) -> impl IntoResponse {
    Json(ApiResponse::ok(NameMetrics::from_name(&body.name)))
}

fn router() -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/profile", post(profile))
        .route("/grid", post(grid))
        .route("/name-metrics", post(name_metrics));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    let config = match EngineConfig::load(None, &ConfigOverrides::default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let addr = std::env::var("NUMEROLOGY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "🚀 numerology server running");

    if let Err(e) = axum::serve(listener, router()).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

// ============================================================================
// TESTS
// ============================================================================
