//! Handlers for the server-rendered planner flow
//!
//! Every state change is a form post answered with a redirect back to
//! `/trips/{id}`, except rejected form input which is rendered in place.

use axum::{
    Form,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{AppState, render, today};
use crate::TravelAiError;
use crate::models::TravelRequest;
use crate::forms::{DetailsForm, PreferencesForm};
use crate::session::{INCOMPLETE_INPUT_MESSAGE, PlannerSession, Step};
use crate::weather;

/// Error rendered as an HTML page instead of JSON
#[derive(Debug)]
pub struct PageError(TravelAiError);

impl From<TravelAiError> for PageError {
    fn from(error: TravelAiError) -> Self {
        Self(error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let title = if status == StatusCode::NOT_FOUND {
            "Not found"
        } else {
            "Something went wrong"
        };
        (status, Html(render::error_page(title, &self.0.user_message()))).into_response()
    }
}

fn session_not_found() -> TravelAiError {
    TravelAiError::not_found("This planning session does not exist or has expired.")
}

fn trip_url(id: &str) -> String {
    format!("/trips/{}", urlencoding::encode(id))
}

async fn snapshot(state: &AppState, id: &str) -> Result<PlannerSession, PageError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found().into())
}

/// Apply `f` to the session and redirect back to its page
async fn update_and_redirect(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut PlannerSession),
) -> Result<Redirect, PageError> {
    state
        .sessions
        .update(id, f)
        .await
        .ok_or_else(session_not_found)?;
    Ok(Redirect::to(&trip_url(id)))
}

pub async fn new_trip(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create().await;
    info!("Created planner session {id}");
    Redirect::to(&trip_url(&id))
}

pub async fn show_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let session = snapshot(&state, &id).await?;
    let ctx = render::PageContext {
        today: today(),
        ..render::PageContext::default()
    };
    Ok(Html(render::page(&session, &ctx)))
}

pub async fn submit_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DetailsForm>,
) -> Result<Response, PageError> {
    let today = today();
    match form.validate(today) {
        Ok(details) => {
            debug!("Session {id}: details saved for {}", details.destination);
            Ok(update_and_redirect(&state, &id, |s| s.set_details(details))
                .await?
                .into_response())
        }
        Err(errors) => {
            let session = snapshot(&state, &id).await?;
            let ctx = render::PageContext {
                today,
                details_form: Some((&form, &errors)),
                ..render::PageContext::default()
            };
            let mut shown = session;
            shown.step = Step::Details;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render::page(&shown, &ctx)),
            )
                .into_response())
        }
    }
}

pub async fn submit_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError> {
    let form = PreferencesForm::from_pairs(&pairs);
    match form.validate() {
        Ok(preferences) => Ok(
            update_and_redirect(&state, &id, |s| s.set_preferences(preferences))
                .await?
                .into_response(),
        ),
        Err(errors) => {
            let mut shown = snapshot(&state, &id).await?;
            shown.step = Step::Preferences;
            let ctx = render::PageContext {
                today: today(),
                preferences_form: Some((&form, &errors)),
                ..render::PageContext::default()
            };
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render::page(&shown, &ctx)),
            )
                .into_response())
        }
    }
}

/// Store generated output with `f`, unless the visitor reset the session or
/// changed the input while the planner was running
async fn store_if_unchanged(
    state: &AppState,
    id: &str,
    request: &TravelRequest,
    what: &str,
    f: impl FnOnce(&mut PlannerSession),
) -> Result<Redirect, PageError> {
    let stored = state
        .sessions
        .update(id, |s| {
            if s.request().as_ref() != Some(request) {
                return false;
            }
            f(s);
            true
        })
        .await
        .ok_or_else(session_not_found)?;
    if !stored {
        warn!("Session {id}: input changed during generation, discarding {what}");
    }
    Ok(Redirect::to(&trip_url(id)))
}

/// Send the visitor back to the first step when input is missing
async fn require_input(state: &AppState, id: &str) -> Result<(), PageError> {
    state
        .sessions
        .update(id, |s| {
            s.error_message = Some(INCOMPLETE_INPUT_MESSAGE.to_string());
            s.step = Step::Details;
        })
        .await
        .ok_or_else(session_not_found)?;
    Ok(())
}

pub async fn generate_suggestions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let session = snapshot(&state, &id).await?;
    let Some(request) = session.request() else {
        require_input(&state, &id).await?;
        return Ok(Redirect::to(&trip_url(&id)));
    };

    let generated = state.planner.generate_suggestions(&request).await;
    store_if_unchanged(&state, &id, &request, "suggestions", |s| {
        s.set_suggestions(generated.value, generated.notice);
    })
    .await
}

pub async fn generate_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let session = snapshot(&state, &id).await?;
    let Some(request) = session.request() else {
        require_input(&state, &id).await?;
        return Ok(Redirect::to(&trip_url(&id)));
    };

    let details = &request.details;
    let (plan, forecast) = tokio::join!(
        state.planner.plan(&request, session.suggestions),
        weather::forecast_or_none(
            state.weather.as_ref(),
            &details.destination,
            details.start_date,
            details.end_date,
        ),
    );
    info!(
        "Session {id}: itinerary ready ({} days, weather {})",
        plan.itinerary.day_count(),
        if forecast.is_some() { "available" } else { "omitted" }
    );

    store_if_unchanged(&state, &id, &request, "itinerary", |s| {
        s.suggestions = Some(plan.suggestions);
        s.set_itinerary(plan.itinerary, forecast, plan.notices);
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct StepForm {
    pub step: String,
}

pub async fn change_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StepForm>,
) -> Result<Redirect, PageError> {
    let target: Step = form
        .step
        .parse()
        .map_err(|e: String| PageError(TravelAiError::validation(e)))?;
    update_and_redirect(&state, &id, |s| {
        s.go_to(target);
    })
    .await
}

pub async fn toggle_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    update_and_redirect(&state, &id, |s| {
        s.toggle_theme();
    })
    .await
}

pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    update_and_redirect(&state, &id, PlannerSession::reset).await
}

pub async fn clear_error(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    update_and_redirect(&state, &id, PlannerSession::clear_error).await
}

pub async fn download_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let session = snapshot(&state, &id).await?;
    let itinerary = session
        .itinerary
        .ok_or_else(|| TravelAiError::not_found("No itinerary has been generated yet."))?;
    let body = serde_json::to_string_pretty(&itinerary)
        .map_err(|e| TravelAiError::general(format!("Failed to serialize itinerary: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"travel_itinerary.json\"",
            ),
        ],
        body,
    )
        .into_response())
}
