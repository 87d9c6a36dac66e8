//! Static payloads served when Gemini is unavailable or answers badly

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{
    ActivityKind, Itinerary, ItineraryDay, ScheduledActivity, SuggestionItem, SuggestionSet,
};

/// Three attractions, restaurants and activities in Paris
#[must_use]
pub fn mock_suggestions() -> SuggestionSet {
    SuggestionSet {
        attractions: vec![
            SuggestionItem::new("Parisian Museum", "Historical artifacts", "20EUR")
                .with_time_needed("3hours"),
            SuggestionItem::new("Eiffel Tower", "Iconic Parisian landmark", "25EUR")
                .with_time_needed("2hours"),
            SuggestionItem::new("Notre Dame", "Historical cathedral", "0EUR")
                .with_time_needed("1hour"),
        ],
        restaurants: vec![
            SuggestionItem::new("Le Bistro", "Traditional French cuisine", "30EUR")
                .with_cuisine("French"),
            SuggestionItem::new("Cafe Paris", "Casual French dining", "25EUR")
                .with_cuisine("French"),
            SuggestionItem::new("Brasserie Royal", "Elegant dining", "45EUR")
                .with_cuisine("French"),
        ],
        activities: vec![
            SuggestionItem::new("River Cruise", "Seine River tour", "15EUR")
                .with_time_needed("1hour"),
            SuggestionItem::new("Wine Tours", "Wine tasting", "40EUR").with_time_needed("3hours"),
            SuggestionItem::new("Bike Rental", "City bike tour", "10EUR")
                .with_time_needed("2hours"),
        ],
    }
}

fn entry(
    time: &str,
    duration: &str,
    description: &str,
    location: &str,
    cost: &str,
    kind: ActivityKind,
) -> ScheduledActivity {
    ScheduledActivity {
        time: time.to_string(),
        duration: duration.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        cost: cost.to_string(),
        kind,
    }
}

/// One-day Paris itinerary dated on `start_date`
#[must_use]
pub fn mock_itinerary(start_date: NaiveDate) -> Itinerary {
    let day = ItineraryDay {
        day: 1,
        date: start_date.format("%Y-%m-%d").to_string(),
        activities: vec![
            entry(
                "09:00",
                "3hours",
                "Explore Museum",
                "Parisian Museum",
                "20EUR",
                ActivityKind::Activity,
            ),
            entry("12:30", "1hour", "Lunch", "Le Bistro", "30EUR", ActivityKind::Meal),
            entry(
                "14:00",
                "2hours",
                "City Tour",
                "Bike Rental",
                "10EUR",
                ActivityKind::Activity,
            ),
        ],
        daily_budget: "60EUR".to_string(),
        notes: Some("Start with a museum visit and a relaxing bike tour around".to_string()),
    };

    let emergency_contacts = BTreeMap::from([
        ("police".to_string(), "17".to_string()),
        ("ambulance".to_string(), "15".to_string()),
        ("tourist_police".to_string(), "17".to_string()),
    ]);

    Itinerary {
        daily_plans: vec![day],
        total_budget: "60EUR".to_string(),
        general_tips: vec![
            "Book museum tickets in advance".to_string(),
            "Use local transport".to_string(),
            "Carry water".to_string(),
        ],
        emergency_contacts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::validate_itinerary;

    #[test]
    fn test_mock_suggestions_have_three_of_each() {
        let set = mock_suggestions();
        assert_eq!(set.attractions.len(), 3);
        assert_eq!(set.restaurants.len(), 3);
        assert_eq!(set.activities.len(), 3);
        assert!(set.restaurants.iter().all(|r| r.cuisine.as_deref() == Some("French")));
    }

    #[test]
    fn test_mock_itinerary_is_valid_and_dated() {
        let start = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let mut itinerary = mock_itinerary(start);
        validate_itinerary(&mut itinerary).unwrap();
        assert_eq!(itinerary.daily_plans[0].date, "2026-11-01");
        assert_eq!(itinerary.emergency_contacts["ambulance"], "15");
        assert_eq!(itinerary.activities().count(), 3);
    }
}
