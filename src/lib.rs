//! `TravelAI` - AI-powered travel planning
//!
//! Collects trip details and preferences, asks Gemini for place suggestions
//! and a day-by-day itinerary, and renders the result next to the weather
//! forecast for the trip dates.

pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod gemini;
pub mod logging;
pub mod models;
pub mod parser;
pub mod planner;
pub mod prompts;
pub mod session;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::TravelAiConfig;
pub use error::TravelAiError;
pub use gemini::{GeminiClient, GenerativeModel};
pub use models::{DailyWeather, Itinerary, SuggestionSet, TravelRequest};
pub use planner::{Generated, TravelPlanner, TripPlan};
pub use session::SessionManager;
pub use weather::WeatherSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelAiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
