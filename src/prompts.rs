//! Prompt templates for the two Gemini calls
//!
//! Templates are fixed text with `{{placeholder}}` slots. Filling them is a
//! plain substitution, so a given request always yields the same prompt.

use serde::Serialize;

use crate::models::{SuggestionItem, SuggestionSet, TravelRequest};

/// Asks for three attractions, restaurants and activities
pub const SUGGESTION_TEMPLATE: &str = r#"Generate a JSON response with exactly 3 attractions, 3 restaurants, and 3 activities for a trip.
Respond with a single JSON object and nothing else.

Location: {{destination}}
Dates: {{start_date}} to {{end_date}} ({{duration}} days)
Budget: {{budget}}
Interests: {{interests}}
Dietary preferences: {{dietary}}
Accommodation: {{accommodation}}
Preferred pace (1 relaxed - 5 active): {{pace}}
Maximum walking time per day: {{walking}} hours
Mobility concerns: {{mobility}}

Required structure (on a single line):
{"attractions":[{"name":"Place1","description":"Simple description","cost":"XEUR","time_needed":"Xhours"}],"restaurants":[{"name":"Place1","description":"Simple description","cost":"XEUR","cuisine":"Type"}],"activities":[{"name":"Activity1","description":"Simple description","cost":"XEUR","time_needed":"Xhours"}]}
"#;

/// Asks for the day-by-day plan built from the suggested places
pub const ITINERARY_TEMPLATE: &str = r#"Generate a {{duration}}-day itinerary for {{destination}} as JSON.
Respond with a single JSON object and nothing else. Use only ASCII characters.

Budget: {{budget}}
Preferred pace (1 relaxed - 5 active): {{pace}}
Maximum walking time per day: {{walking}} hours
Dietary preferences: {{dietary}}
Mobility concerns: {{mobility}}

Available places (use these names exactly):
Attractions: {{attractions}}
Restaurants: {{restaurants}}
Activities: {{activities}}

Rules:
1. Each day needs 2-3 activities
2. Include lunch between 12:00-14:00
3. Use 24-hour time format (e.g., "09:00") with quotes
4. Keep descriptions under 50 chars
5. Use simple costs (e.g., "20EUR")
6. Day 1 is {{start_date}}; number days from 1 and give every day its date
7. Only use these activity types: "activity", "meal", or "transport"
   - Use "activity" for attractions and activities
   - Use "meal" for restaurants
   - Use "transport" for travel between locations

Required JSON structure (one line):
{"daily_plans":[{"day":1,"date":"{{start_date}}","activities":[{"time":"09:00","duration":"2hours","description":"Visit museum","location":"PlaceName","cost":"20EUR","type":"activity"},{"time":"12:00","duration":"1hour","description":"Lunch break","location":"RestaurantName","cost":"15EUR","type":"meal"}],"daily_budget":"35EUR","notes":"Morning activities"}],"total_budget":"35EUR","general_tips":["Use the metro"],"emergency_contacts":{"police":"17","ambulance":"15"}}
"#;

/// Name and cost of a suggestion, the only parts the itinerary prompt needs
#[derive(Serialize)]
struct PlaceRef<'a> {
    name: &'a str,
    cost: &'a str,
}

/// Replace every `{{key}}` slot in `template`
#[must_use]
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// Slot values shared by both prompts
fn request_values(request: &TravelRequest) -> Vec<(&'static str, String)> {
    let details = &request.details;
    let prefs = &request.preferences;

    vec![
        ("destination", details.destination.trim().to_string()),
        ("start_date", details.start_date.format("%Y-%m-%d").to_string()),
        ("end_date", details.end_date.format("%Y-%m-%d").to_string()),
        ("duration", request.duration_days().to_string()),
        ("budget", details.budget.label().to_string()),
        ("interests", join_or(&prefs.interests, "Any")),
        ("dietary", join_or(&prefs.dietary_preferences, "No Restrictions")),
        ("accommodation", prefs.accommodation.label().to_string()),
        ("pace", prefs.preferred_pace.to_string()),
        ("walking", prefs.max_walking_hours.to_string()),
        (
            "mobility",
            prefs
                .mobility_concerns
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("None")
                .to_string(),
        ),
    ]
}

fn join_or<T: std::fmt::Display>(items: &[T], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn place_list(items: &[SuggestionItem]) -> String {
    let refs: Vec<PlaceRef<'_>> = items
        .iter()
        .map(|item| PlaceRef {
            name: &item.name,
            cost: &item.cost,
        })
        .collect();
    // Serializing borrowed strings cannot fail
    serde_json::to_string(&refs).unwrap_or_else(|_| "[]".to_string())
}

/// Prompt for the suggestion step
#[must_use]
pub fn suggestion_prompt(request: &TravelRequest) -> String {
    render_template(SUGGESTION_TEMPLATE, &request_values(request))
}

/// Prompt for the itinerary step, embedding the suggestions already shown
#[must_use]
pub fn itinerary_prompt(request: &TravelRequest, suggestions: &SuggestionSet) -> String {
    let mut values = request_values(request);
    values.push(("attractions", place_list(&suggestions.attractions)));
    values.push(("restaurants", place_list(&suggestions.restaurants)));
    values.push(("activities", place_list(&suggestions.activities)));
    render_template(ITINERARY_TEMPLATE, &values)
}
