//! Per-visitor planner sessions
//!
//! Each browser gets one [`PlannerSession`] holding its wizard position,
//! the submitted form steps and whatever the planner produced. Sessions
//! live in memory only and are dropped after a period of inactivity.

use std::{
    collections::HashMap,
    fmt::Debug,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    DailyWeather, Itinerary, SuggestionSet, TravelRequest, TripDetails, TripPreferences,
};

/// Error shown when the generate step is opened without complete input
pub const INCOMPLETE_INPUT_MESSAGE: &str =
    "Please complete all required information in the previous steps.";

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Details,
    Preferences,
    Generate,
    Plan,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Details, Step::Preferences, Step::Generate, Step::Plan];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::Details => "User Details",
            Step::Preferences => "Preferences",
            Step::Generate => "Generate Itinerary",
            Step::Plan => "Final Plan",
        }
    }

    /// Form value used by the navigation buttons
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Step::Details => "details",
            Step::Preferences => "preferences",
            Step::Generate => "generate",
            Step::Plan => "plan",
        }
    }

    /// 1-based position, for the progress bar
    #[must_use]
    pub fn number(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn next(self) -> Step {
        match self {
            Step::Details => Step::Preferences,
            Step::Preferences => Step::Generate,
            Step::Generate | Step::Plan => Step::Plan,
        }
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown step: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// State of one visitor's planning flow
#[derive(Debug, Clone)]
pub struct PlannerSession {
    pub id: String,
    pub step: Step,
    pub details: Option<TripDetails>,
    pub preferences: Option<TripPreferences>,
    pub suggestions: Option<SuggestionSet>,
    pub itinerary: Option<Itinerary>,
    /// `None` when the weather lookup failed or has not run
    pub weather: Option<Vec<DailyWeather>>,
    /// Non-fatal warnings from the last generation, e.g. sample data in use
    pub notices: Vec<String>,
    /// Persistent error banner, cleared explicitly by the visitor
    pub error_message: Option<String>,
    pub theme: Theme,
    last_active: Instant,
}

impl PlannerSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step: Step::default(),
            details: None,
            preferences: None,
            suggestions: None,
            itinerary: None,
            weather: None,
            notices: Vec::new(),
            error_message: None,
            theme: Theme::default(),
            last_active: Instant::now(),
        }
    }

    /// The combined request, once both form steps are filled in
    #[must_use]
    pub fn request(&self) -> Option<TravelRequest> {
        Some(TravelRequest::new(
            self.details.clone()?,
            self.preferences.clone()?,
        ))
    }

    fn clear_generated(&mut self) {
        self.suggestions = None;
        self.itinerary = None;
        self.weather = None;
        self.notices.clear();
    }

    /// Store validated trip details and advance. Changed input discards
    /// anything generated from the previous input.
    pub fn set_details(&mut self, details: TripDetails) {
        if self.details.as_ref() != Some(&details) {
            self.clear_generated();
        }
        self.details = Some(details);
        self.step = Step::Preferences;
    }

    pub fn set_preferences(&mut self, preferences: TripPreferences) {
        if self.preferences.as_ref() != Some(&preferences) {
            self.clear_generated();
        }
        self.preferences = Some(preferences);
        self.step = Step::Generate;
    }

    /// Store fresh suggestions; a previous itinerary no longer matches them
    pub fn set_suggestions(&mut self, suggestions: SuggestionSet, notice: Option<String>) {
        self.suggestions = Some(suggestions);
        self.itinerary = None;
        self.weather = None;
        self.notices = notice.into_iter().collect();
    }

    /// Store the finished plan and move to the final step
    pub fn set_itinerary(
        &mut self,
        itinerary: Itinerary,
        weather: Option<Vec<DailyWeather>>,
        notices: impl IntoIterator<Item = String>,
    ) {
        self.itinerary = Some(itinerary);
        self.weather = weather;
        for notice in notices {
            if !self.notices.contains(&notice) {
                self.notices.push(notice);
            }
        }
        self.step = Step::Plan;
    }

    /// Furthest step the visitor may open
    #[must_use]
    pub fn max_step(&self) -> Step {
        if self.itinerary.is_some() {
            Step::Plan
        } else if self.request().is_some() {
            Step::Generate
        } else if self.details.is_some() {
            Step::Preferences
        } else {
            Step::Details
        }
    }

    /// Jump to `target`, or to the nearest step whose input is complete.
    /// Returns the step actually shown.
    pub fn go_to(&mut self, target: Step) -> Step {
        let reachable = self.max_step();
        self.step = if target <= reachable {
            target
        } else {
            match target {
                Step::Generate => {
                    self.error_message = Some(INCOMPLETE_INPUT_MESSAGE.to_string());
                    Step::Details
                }
                Step::Plan if reachable == Step::Generate => Step::Generate,
                Step::Plan => {
                    self.error_message = Some(INCOMPLETE_INPUT_MESSAGE.to_string());
                    Step::Details
                }
                _ => reachable,
            }
        };
        self.step
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Start over with an empty session under the same id
    pub fn reset(&mut self) {
        *self = PlannerSession::new(std::mem::take(&mut self.id));
    }
}

/// In-memory session store with idle expiry
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, PlannerSession>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_live(&self, session: &PlannerSession) -> bool {
        session.last_active.elapsed() < self.ttl
    }

    /// Create a fresh session and return its id. Expired sessions are
    /// purged on the way.
    pub async fn create(&self) -> String {
        let removed = self.purge_expired().await;
        if removed > 0 {
            debug!("Purged {removed} expired sessions");
        }

        let id = Uuid::new_v4().to_string();
        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), PlannerSession::new(id.clone()));
        id
    }

    /// Snapshot of a live session. Reading counts as activity.
    pub async fn get(&self, id: &str) -> Option<PlannerSession> {
        let mut guard = self.inner.write().await;
        let session = guard.get_mut(id).filter(|s| self.is_live(s))?;
        session.last_active = Instant::now();
        Some(session.clone())
    }

    /// Mutate a live session in place and touch it
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut PlannerSession) -> R) -> Option<R> {
        let mut guard = self.inner.write().await;
        let session = guard.get_mut(id).filter(|s| self.is_live(s))?;
        session.last_active = Instant::now();
        Some(f(session))
    }

    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(id).is_some()
    }

    /// Remove sessions idle longer than the ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, s| s.last_active.elapsed() < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
