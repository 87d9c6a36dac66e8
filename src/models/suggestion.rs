//! Suggestion set: the places the AI proposes before the itinerary is built

use serde::{Deserialize, Serialize};

/// One suggested attraction, restaurant or activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form cost as the AI wrote it, e.g. "20EUR"
    #[serde(default)]
    pub cost: String,
    /// Visit length, for attractions and activities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_needed: Option<String>,
    /// Cuisine, for restaurants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

/// Attractions, restaurants and activities for one destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub attractions: Vec<SuggestionItem>,
    pub restaurants: Vec<SuggestionItem>,
    pub activities: Vec<SuggestionItem>,
}

impl SuggestionItem {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, cost: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cost: cost.into(),
            time_needed: None,
            cuisine: None,
        }
    }

    #[must_use]
    pub fn with_time_needed(mut self, time_needed: impl Into<String>) -> Self {
        self.time_needed = Some(time_needed.into());
        self
    }

    #[must_use]
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }
}

impl SuggestionSet {
    /// Total number of suggested places
    #[must_use]
    pub fn len(&self) -> usize {
        self.attractions.len() + self.restaurants.len() + self.activities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The three categories with their display titles
    #[must_use]
    pub fn categories(&self) -> [(&'static str, &[SuggestionItem]); 3] {
        [
            ("Attractions", &self.attractions),
            ("Restaurants", &self.restaurants),
            ("Activities", &self.activities),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_optional_fields_are_omitted() {
        let item = SuggestionItem::new("Louvre", "Famous museum", "20EUR");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("time_needed"));
        assert!(!json.contains("cuisine"));
    }

    #[test]
    fn test_item_accepts_minimal_json() {
        let item: SuggestionItem = serde_json::from_str(r#"{"name":"Cafe"}"#).unwrap();
        assert_eq!(item.name, "Cafe");
        assert!(item.description.is_empty());
        assert!(item.cost.is_empty());
    }

    #[test]
    fn test_len_counts_all_categories() {
        let set = SuggestionSet {
            attractions: vec![SuggestionItem::new("A", "", "")],
            restaurants: vec![SuggestionItem::new("R", "", "").with_cuisine("French")],
            activities: vec![],
        };
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.categories()[1].0, "Restaurants");
        assert!(SuggestionSet::default().is_empty());
    }
}
