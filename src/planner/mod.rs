//! Planner service: prompt, call the model, parse, fall back to sample data
//!
//! The planner never fails. Whatever goes wrong between the prompt and the
//! parsed value is logged and answered with the static payloads from
//! [`mock`], together with a notice the UI can show as a warning.

pub mod mock;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::gemini::GenerativeModel;
use crate::models::{Itinerary, SuggestionSet, TravelRequest};
use crate::{TravelAiError, parser, prompts};

pub use mock::{mock_itinerary, mock_suggestions};

/// Notice shown when no model is configured
pub const SAMPLE_DATA_NOTICE: &str =
    "Gemini is not configured, showing sample data for demonstration purposes.";

/// A planner result and, when sample data was substituted, the reason
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub notice: Option<String>,
}

impl<T> Generated<T> {
    fn fresh(value: T) -> Self {
        Self { value, notice: None }
    }

    fn fallback(value: T, notice: impl Into<String>) -> Self {
        Self {
            value,
            notice: Some(notice.into()),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.notice.is_some()
    }
}

/// Suggestions and itinerary produced together by [`TravelPlanner::plan`]
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub suggestions: SuggestionSet,
    pub itinerary: Itinerary,
    pub notices: Vec<String>,
}

#[derive(Clone)]
pub struct TravelPlanner {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl std::fmt::Debug for TravelPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TravelPlanner")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl TravelPlanner {
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Planner that always serves the sample payloads
    #[must_use]
    pub fn mock() -> Self {
        Self { model: None }
    }

    #[must_use]
    pub fn from_model(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        Self { model }
    }

    #[must_use]
    pub fn is_mock(&self) -> bool {
        self.model.is_none()
    }

    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    #[instrument(skip(self, request), fields(destination = %request.details.destination))]
    pub async fn generate_suggestions(&self, request: &TravelRequest) -> Generated<SuggestionSet> {
        let Some(model) = &self.model else {
            return Generated::fallback(mock_suggestions(), SAMPLE_DATA_NOTICE);
        };

        let prompt = prompts::suggestion_prompt(request);
        let result = match model.generate(&prompt).await {
            Ok(text) => parser::parse_suggestions(&text),
            Err(e) => Err(e),
        };

        match result {
            Ok(suggestions) => {
                info!("Generated {} suggestions", suggestions.len());
                Generated::fresh(suggestions)
            }
            Err(e) => {
                log_failure("suggestions", &e);
                Generated::fallback(mock_suggestions(), failure_notice("suggestions", &e))
            }
        }
    }

    #[instrument(skip(self, request, suggestions), fields(destination = %request.details.destination))]
    pub async fn generate_itinerary(
        &self,
        request: &TravelRequest,
        suggestions: &SuggestionSet,
    ) -> Generated<Itinerary> {
        let start_date = request.details.start_date;
        let Some(model) = &self.model else {
            return Generated::fallback(mock_itinerary(start_date), SAMPLE_DATA_NOTICE);
        };

        let prompt = prompts::itinerary_prompt(request, suggestions);
        let result = match model.generate(&prompt).await {
            Ok(text) => parser::parse_itinerary(&text),
            Err(e) => Err(e),
        };

        match result {
            Ok(itinerary) => {
                info!("Generated a {}-day itinerary", itinerary.day_count());
                Generated::fresh(itinerary)
            }
            Err(e) => {
                log_failure("itinerary", &e);
                Generated::fallback(mock_itinerary(start_date), failure_notice("itinerary", &e))
            }
        }
    }

    /// Build an itinerary, generating suggestions first when none are given
    pub async fn plan(&self, request: &TravelRequest, suggestions: Option<SuggestionSet>) -> TripPlan {
        let mut notices = Vec::new();

        let suggestions = match suggestions {
            Some(suggestions) => suggestions,
            None => {
                let generated = self.generate_suggestions(request).await;
                notices.extend(generated.notice);
                generated.value
            }
        };

        let itinerary = self.generate_itinerary(request, &suggestions).await;
        if let Some(notice) = itinerary.notice
            && !notices.contains(&notice)
        {
            notices.push(notice);
        }

        TripPlan {
            suggestions,
            itinerary: itinerary.value,
            notices,
        }
    }
}

fn log_failure(what: &str, error: &TravelAiError) {
    if error.is_quota() {
        warn!("Gemini quota exceeded while generating {what}, serving sample data");
    } else {
        warn!("Error generating {what}, serving sample data: {error}");
    }
}

fn failure_notice(what: &str, error: &TravelAiError) -> String {
    format!(
        "Could not generate {what} ({}). Showing sample {what} instead.",
        error.user_message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::models::{BudgetTier, Interest, TripDetails, TripPreferences};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SUGGESTIONS_JSON: &str = r#"{"attractions":[{"name":"Alhambra","description":"Palace","cost":"19EUR","time_needed":"3hours"}],"restaurants":[{"name":"Bodega","description":"Tapas","cost":"15EUR","cuisine":"Spanish"}],"activities":[]}"#;

    const ITINERARY_JSON: &str = r#"{"daily_plans":[{"day":1,"date":"2026-11-01","activities":[{"time":"9","duration":"3hours","description":"Palace","location":"Alhambra","cost":"19EUR","type":"activity"}],"daily_budget":"19EUR"}],"total_budget":"19EUR","general_tips":[],"emergency_contacts":{"emergency":"112"}}"#;

    /// Replays canned answers and counts calls
    struct ScriptedModel {
        answers: Mutex<Vec<Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(answers: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(TravelAiError::api("no more answers")))
        }
    }

    fn request() -> TravelRequest {
        TravelRequest::new(
            TripDetails {
                destination: "Granada".to_string(),
                start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
                budget: BudgetTier::Budget,
            },
            TripPreferences {
                interests: vec![Interest::HistoricalSites],
                ..TripPreferences::default()
            },
        )
    }

    #[tokio::test]
    async fn test_mock_planner_serves_samples_with_notice() {
        let planner = TravelPlanner::mock();
        assert!(planner.is_mock());

        let suggestions = planner.generate_suggestions(&request()).await;
        assert_eq!(suggestions.value, mock_suggestions());
        assert_eq!(suggestions.notice.as_deref(), Some(SAMPLE_DATA_NOTICE));

        let itinerary = planner.generate_itinerary(&request(), &suggestions.value).await;
        assert_eq!(itinerary.value.daily_plans[0].date, "2026-11-01");
        assert!(itinerary.is_fallback());
    }

    #[tokio::test]
    async fn test_valid_answers_are_parsed() {
        let model = ScriptedModel::new(vec![
            Ok(SUGGESTIONS_JSON.to_string()),
            Ok(format!("```json\n{ITINERARY_JSON}\n```")),
        ]);
        let planner = TravelPlanner::new(model.clone());

        let suggestions = planner.generate_suggestions(&request()).await;
        assert!(!suggestions.is_fallback());
        assert_eq!(suggestions.value.attractions[0].name, "Alhambra");

        let itinerary = planner.generate_itinerary(&request(), &suggestions.value).await;
        assert!(!itinerary.is_fallback());
        assert_eq!(itinerary.value.daily_plans[0].activities[0].time, "09:00");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_answer_falls_back_once() {
        let model = ScriptedModel::new(vec![Ok("Sorry, I can't help with that.".to_string())]);
        let planner = TravelPlanner::new(model.clone());

        let suggestions = planner.generate_suggestions(&request()).await;
        assert_eq!(model.calls(), 1);
        assert_eq!(suggestions.value, mock_suggestions());
        let notice = suggestions.notice.unwrap();
        assert!(notice.starts_with("Could not generate suggestions"));
    }

    #[tokio::test]
    async fn test_api_error_falls_back_and_planner_recovers() {
        let model = ScriptedModel::new(vec![
            Err(TravelAiError::api("Gemini quota exceeded (429)")),
            Ok(SUGGESTIONS_JSON.to_string()),
        ]);
        let planner = TravelPlanner::new(model.clone());

        let first = planner.generate_suggestions(&request()).await;
        assert!(first.is_fallback());

        // No sticky mock mode: the next call goes to the model again
        let second = planner.generate_suggestions(&request()).await;
        assert!(!second.is_fallback());
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_plan_generates_missing_suggestions() {
        let model = ScriptedModel::new(vec![
            Ok(SUGGESTIONS_JSON.to_string()),
            Ok(ITINERARY_JSON.to_string()),
        ]);
        let planner = TravelPlanner::new(model.clone());

        let plan = planner.plan(&request(), None).await;
        assert_eq!(plan.suggestions.restaurants[0].name, "Bodega");
        assert_eq!(plan.itinerary.total_budget, "19EUR");
        assert!(plan.notices.is_empty());
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_plan_with_mock_deduplicates_notices() {
        let plan = TravelPlanner::mock().plan(&request(), None).await;
        assert_eq!(plan.notices, vec![SAMPLE_DATA_NOTICE.to_string()]);
    }
}
