//! Data models for the TravelAI planner
//!
//! This module contains the core domain models organized by concern:
//! - Request: what the visitor asked for, built from the two form steps
//! - Suggestion: places proposed by the AI before planning
//! - Itinerary: the day-by-day plan
//! - Weather: per-day forecast summaries

pub mod itinerary;
pub mod request;
pub mod suggestion;
pub mod weather;

// Re-export all public types for convenient access
pub use itinerary::{ActivityKind, Itinerary, ItineraryDay, ScheduledActivity};
pub use request::{
    AccommodationType, BudgetTier, DietaryPreference, FieldError, FieldErrors, Interest,
    MAX_DAYS_AHEAD, PACE_RANGE, TravelRequest, TripDetails, TripPreferences, WALKING_HOURS_RANGE,
};
pub use suggestion::{SuggestionItem, SuggestionSet};
pub use weather::DailyWeather;
