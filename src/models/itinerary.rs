//! Itinerary model: the day-by-day plan returned by the AI

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What kind of slot an itinerary entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ActivityKind {
    Activity,
    Meal,
    Transport,
}

impl ActivityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Activity => "activity",
            ActivityKind::Meal => "meal",
            ActivityKind::Transport => "transport",
        }
    }
}

impl TryFrom<String> for ActivityKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "activity" => Ok(ActivityKind::Activity),
            "meal" => Ok(ActivityKind::Meal),
            "transport" => Ok(ActivityKind::Transport),
            _ => Err(format!("Invalid activity type: {value}")),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled entry of a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    /// Start time, `HH:MM` once validated
    pub time: String,
    pub duration: String,
    pub description: String,
    pub location: String,
    pub cost: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

/// A single day of the itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-based day counter
    pub day: u32,
    /// ISO date as returned by the AI
    pub date: String,
    pub activities: Vec<ScheduledActivity>,
    pub daily_budget: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The complete plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub daily_plans: Vec<ItineraryDay>,
    pub total_budget: String,
    pub general_tips: Vec<String>,
    /// Service name to phone number
    pub emergency_contacts: BTreeMap<String, String>,
}

impl ScheduledActivity {
    /// Leading whole hours of the duration text ("2hours" -> 2)
    #[must_use]
    pub fn duration_hours(&self) -> Option<u32> {
        let digits: String = self
            .duration
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

impl Itinerary {
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.daily_plans.len()
    }

    /// Every entry across all days, in order
    pub fn activities(&self) -> impl Iterator<Item = &ScheduledActivity> {
        self.daily_plans.iter().flat_map(|day| day.activities.iter())
    }
}
