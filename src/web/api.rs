//! Stateless JSON endpoints

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{AppState, today};
use crate::models::{DailyWeather, Itinerary, SuggestionSet, TravelRequest};
use crate::{Result, TravelAiError, VERSION, weather};

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: SuggestionSet,
    /// Set when sample data was returned instead of a generated answer
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    #[serde(flatten)]
    pub request: TravelRequest,
    /// Suggestions from an earlier call; generated when absent
    #[serde(default)]
    pub suggestions: Option<SuggestionSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub suggestions: SuggestionSet,
    pub itinerary: Itinerary,
    /// Omitted when the forecast could not be fetched
    pub weather: Option<Vec<DailyWeather>>,
    pub notices: Vec<String>,
}

fn accept<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| TravelAiError::validation(rejection.body_text()))
}

fn validated(request: &TravelRequest) -> Result<()> {
    request
        .validate(today())
        .map_err(|errors| TravelAiError::validation(errors.to_string()))
}

pub async fn suggestions(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TravelRequest>, JsonRejection>,
) -> Result<Json<SuggestionsResponse>> {
    let request = accept(payload)?;
    validated(&request)?;

    let generated = state.planner.generate_suggestions(&request).await;
    Ok(Json(SuggestionsResponse {
        suggestions: generated.value,
        notice: generated.notice,
    }))
}

pub async fn itinerary(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ItineraryRequest>, JsonRejection>,
) -> Result<Json<ItineraryResponse>> {
    let ItineraryRequest {
        request,
        suggestions,
    } = accept(payload)?;
    validated(&request)?;

    let details = &request.details;
    let (plan, forecast) = tokio::join!(
        state.planner.plan(&request, suggestions),
        weather::forecast_or_none(
            state.weather.as_ref(),
            &details.destination,
            details.start_date,
            details.end_date,
        ),
    );

    Ok(Json(ItineraryResponse {
        suggestions: plan.suggestions,
        itinerary: plan.itinerary,
        weather: forecast,
        notices: plan.notices,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "mode": if state.planner.is_mock() { "sample" } else { "gemini" },
        "model": state.planner.model_name(),
        "sessions": state.sessions.len().await,
    }))
}
