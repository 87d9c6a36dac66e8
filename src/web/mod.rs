//! HTTP surface: the server-rendered planner pages and a small JSON API

pub mod api;
pub mod pages;
pub mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::TravelAiConfig;
use crate::planner::TravelPlanner;
use crate::session::SessionManager;
use crate::weather::{self, WeatherSource};
use crate::{TravelAiError, gemini};

/// Shared handler state; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub planner: TravelPlanner,
    pub weather: Arc<dyn WeatherSource>,
}

impl AppState {
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        planner: TravelPlanner,
        weather: Arc<dyn WeatherSource>,
    ) -> Self {
        Self {
            sessions,
            planner,
            weather,
        }
    }

    /// Connect to Gemini (or fall back to sample data) and build the weather source
    pub async fn from_config(config: &TravelAiConfig) -> crate::Result<Self> {
        let planner = TravelPlanner::from_model(gemini::connect(&config.gemini).await);
        let weather = weather::from_config(&config.weather)?;
        let ttl = Duration::from_secs(u64::from(config.server.session_ttl_minutes) * 60);
        Ok(Self::new(SessionManager::new(ttl), planner, weather))
    }
}

/// Date used as "today" for form validation
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(pages::new_trip))
        .route("/trips/{id}", get(pages::show_trip))
        .route("/trips/{id}/details", post(pages::submit_details))
        .route("/trips/{id}/preferences", post(pages::submit_preferences))
        .route("/trips/{id}/suggestions", post(pages::generate_suggestions))
        .route("/trips/{id}/itinerary", post(pages::generate_itinerary))
        .route("/trips/{id}/itinerary.json", get(pages::download_itinerary))
        .route("/trips/{id}/step", post(pages::change_step))
        .route("/trips/{id}/theme", post(pages::toggle_theme))
        .route("/trips/{id}/reset", post(pages::reset))
        .route("/trips/{id}/error/clear", post(pages::clear_error))
        .route("/api/suggestions", post(api::suggestions))
        .route("/api/itinerary", post(api::itinerary))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run(config: TravelAiConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;
    if let Some(model) = state.planner.model_name() {
        info!("Planner using Gemini model {model}");
    } else {
        info!("Planner running with sample data");
    }

    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{addr}");
    axum::serve(listener, app)
        .await
        .context("Web server stopped unexpectedly")?;
    Ok(())
}

impl TravelAiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            TravelAiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TravelAiError::NotFound { .. } => StatusCode::NOT_FOUND,
            TravelAiError::Api { .. } | TravelAiError::Parse { .. } => StatusCode::BAD_GATEWAY,
            TravelAiError::Config { .. } | TravelAiError::General { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TravelAiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
