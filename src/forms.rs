//! Form submissions for the two input steps
//!
//! Forms keep the raw strings the visitor typed so an invalid submission
//! can be shown again unchanged next to its error messages.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::models::{
    AccommodationType, BudgetTier, DietaryPreference, FieldErrors, Interest, TripDetails,
    TripPreferences,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default trip length offered on an empty form
const DEFAULT_TRIP_DAYS: i64 = 7;

/// Trip details as posted by the first step
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetailsForm {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: String,
}

impl DetailsForm {
    /// Empty form with a one-week trip starting today
    #[must_use]
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            destination: String::new(),
            start_date: today.format(DATE_FORMAT).to_string(),
            end_date: (today + Duration::days(DEFAULT_TRIP_DAYS)).format(DATE_FORMAT).to_string(),
            budget: BudgetTier::default().label().to_string(),
        }
    }

    /// Form prefilled from previously saved details
    #[must_use]
    pub fn from_details(details: &TripDetails) -> Self {
        Self {
            destination: details.destination.clone(),
            start_date: details.start_date.format(DATE_FORMAT).to_string(),
            end_date: details.end_date.format(DATE_FORMAT).to_string(),
            budget: details.budget.label().to_string(),
        }
    }

    /// Parse and validate against the booking window starting at `today`
    pub fn validate(&self, today: NaiveDate) -> Result<TripDetails, FieldErrors> {
        let mut errors = FieldErrors::default();

        let start_date = parse_date(&self.start_date, "start_date", &mut errors);
        let end_date = parse_date(&self.end_date, "end_date", &mut errors);
        let budget = if self.budget.trim().is_empty() {
            BudgetTier::default()
        } else {
            self.budget.parse().unwrap_or_else(|_| {
                errors.push("budget", "Please choose a budget range");
                BudgetTier::default()
            })
        };

        let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
            if self.destination.trim().is_empty() {
                errors.push("destination", "Please enter a destination");
            }
            return Err(errors);
        };

        let details = TripDetails {
            destination: self.destination.trim().to_string(),
            start_date,
            end_date,
            budget,
        };
        if let Err(more) = details.validate(today) {
            errors.extend(more);
        }

        if errors.is_empty() {
            Ok(details)
        } else {
            Err(errors)
        }
    }
}

fn parse_date(value: &str, field: &'static str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, "Please enter a valid date (YYYY-MM-DD)");
            None
        }
    }
}

/// Preferences as posted by the second step. Multi-selects arrive as
/// repeated keys, so this is built from the raw key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesForm {
    pub interests: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub accommodation: String,
    pub mobility_concerns: String,
    pub preferred_pace: String,
    pub max_walking_hours: String,
}

impl Default for PreferencesForm {
    fn default() -> Self {
        Self::from_preferences(&TripPreferences::default())
    }
}

impl PreferencesForm {
    /// Collect posted pairs; unknown keys are ignored
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut form = Self {
            interests: Vec::new(),
            dietary_preferences: Vec::new(),
            accommodation: String::new(),
            mobility_concerns: String::new(),
            preferred_pace: String::new(),
            max_walking_hours: String::new(),
        };

        for (key, value) in pairs {
            match key.as_str() {
                "interests" => form.interests.push(value.clone()),
                "dietary_preferences" => form.dietary_preferences.push(value.clone()),
                "accommodation" => form.accommodation.clone_from(value),
                "mobility_concerns" => form.mobility_concerns.clone_from(value),
                "preferred_pace" => form.preferred_pace.clone_from(value),
                "max_walking_hours" => form.max_walking_hours.clone_from(value),
                _ => {}
            }
        }
        form
    }

    #[must_use]
    pub fn from_preferences(preferences: &TripPreferences) -> Self {
        Self {
            interests: labels(&preferences.interests),
            dietary_preferences: labels(&preferences.dietary_preferences),
            accommodation: preferences.accommodation.label().to_string(),
            mobility_concerns: preferences.mobility_concerns.clone().unwrap_or_default(),
            preferred_pace: preferences.preferred_pace.to_string(),
            max_walking_hours: preferences.max_walking_hours.to_string(),
        }
    }

    pub fn validate(&self) -> Result<TripPreferences, FieldErrors> {
        let mut errors = FieldErrors::default();
        let defaults = TripPreferences::default();

        let interests: Vec<Interest> = parse_all(&self.interests, "interests", &mut errors);
        let mut dietary_preferences: Vec<DietaryPreference> =
            parse_all(&self.dietary_preferences, "dietary_preferences", &mut errors);
        if dietary_preferences.is_empty() {
            dietary_preferences = defaults.dietary_preferences;
        }

        let accommodation = if self.accommodation.trim().is_empty() {
            AccommodationType::default()
        } else {
            self.accommodation.parse().unwrap_or_else(|_| {
                errors.push("accommodation", "Please choose an accommodation type");
                AccommodationType::default()
            })
        };

        let preferred_pace = parse_number(
            &self.preferred_pace,
            defaults.preferred_pace,
            "preferred_pace",
            &mut errors,
        );
        let max_walking_hours = parse_number(
            &self.max_walking_hours,
            defaults.max_walking_hours,
            "max_walking_hours",
            &mut errors,
        );

        let mobility = self.mobility_concerns.trim();
        let preferences = TripPreferences {
            interests,
            dietary_preferences,
            accommodation,
            mobility_concerns: (!mobility.is_empty()).then(|| mobility.to_string()),
            preferred_pace,
            max_walking_hours,
        };

        if let Err(more) = preferences.validate() {
            // A bad number was already reported with a clearer message
            for error in more.iter() {
                if errors.get(error.field).is_none() {
                    errors.push(error.field, error.message.clone());
                }
            }
        }

        if errors.is_empty() {
            Ok(preferences)
        } else {
            Err(errors)
        }
    }

    /// Whether `label` is currently ticked in the interests list
    #[must_use]
    pub fn has_interest(&self, label: &str) -> bool {
        self.interests.iter().any(|i| i.eq_ignore_ascii_case(label))
    }

    #[must_use]
    pub fn has_dietary(&self, label: &str) -> bool {
        self.dietary_preferences
            .iter()
            .any(|d| d.eq_ignore_ascii_case(label))
    }
}

fn labels<T: std::fmt::Display>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn parse_all<T>(values: &[String], field: &'static str, errors: &mut FieldErrors) -> Vec<T>
where
    T: std::str::FromStr + PartialEq,
{
    let mut parsed = Vec::new();
    for value in values {
        match value.parse::<T>() {
            Ok(item) if !parsed.contains(&item) => parsed.push(item),
            Ok(_) => {}
            Err(_) => errors.push(field, format!("Unknown option: {value}")),
        }
    }
    parsed
}

fn parse_number(value: &str, default: u8, field: &'static str, errors: &mut FieldErrors) -> u8 {
    let value = value.trim();
    if value.is_empty() {
        return default;
    }
    value.parse().unwrap_or_else(|_| {
        errors.push(field, "Please enter a whole number");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_blank_form_defaults() {
        let form = DetailsForm::blank(today());
        assert_eq!(form.start_date, "2026-10-15");
        assert_eq!(form.end_date, "2026-10-22");
        assert_eq!(form.budget, "Moderate ($1000-$3000)");
    }

    #[test]
    fn test_details_form_valid() {
        let form = DetailsForm {
            destination: "  Kyoto ".to_string(),
            start_date: "2026-11-01".to_string(),
            end_date: "2026-11-05".to_string(),
            budget: "Luxury ($3000+)".to_string(),
        };
        let details = form.validate(today()).unwrap();
        assert_eq!(details.destination, "Kyoto");
        assert_eq!(details.budget, BudgetTier::Luxury);
        assert_eq!(details.duration_days(), 5);
        assert_eq!(DetailsForm::from_details(&details).destination, "Kyoto");
    }

    #[rstest]
    #[case("", "2026-11-01", "2026-11-02", "destination")]
    #[case("Kyoto", "tomorrow", "2026-11-02", "start_date")]
    #[case("Kyoto", "2026-11-03", "2026-11-02", "end_date")]
    #[case("Kyoto", "2026-10-01", "2026-10-20", "start_date")]
    #[case("Kyoto", "2026-11-01", "2027-12-01", "end_date")]
    fn test_details_form_errors(
        #[case] destination: &str,
        #[case] start: &str,
        #[case] end: &str,
        #[case] field: &str,
    ) {
        let form = DetailsForm {
            destination: destination.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            budget: String::new(),
        };
        let errors = form.validate(today()).unwrap_err();
        assert!(errors.get(field).is_some(), "expected error on {field}: {errors}");
    }

    #[test]
    fn test_details_form_unknown_budget() {
        let form = DetailsForm {
            destination: "Kyoto".to_string(),
            start_date: "2026-11-01".to_string(),
            end_date: "2026-11-02".to_string(),
            budget: "Unlimited".to_string(),
        };
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(errors.get("budget"), Some("Please choose a budget range"));
    }

    #[test]
    fn test_preferences_multi_select() {
        let form = PreferencesForm::from_pairs(&pairs(&[
            ("interests", "Museums"),
            ("interests", "Nightlife"),
            ("interests", "Museums"),
            ("dietary_preferences", "Vegan"),
            ("accommodation", "Boutique Hotel"),
            ("mobility_concerns", "  wheelchair  "),
            ("preferred_pace", "5"),
            ("max_walking_hours", "2"),
            ("csrf", "ignored"),
        ]));
        assert!(form.has_interest("nightlife"));
        let prefs = form.validate().unwrap();
        assert_eq!(prefs.interests, vec![Interest::Museums, Interest::Nightlife]);
        assert_eq!(prefs.dietary_preferences, vec![DietaryPreference::Vegan]);
        assert_eq!(prefs.accommodation, AccommodationType::BoutiqueHotel);
        assert_eq!(prefs.mobility_concerns.as_deref(), Some("wheelchair"));
        assert_eq!((prefs.preferred_pace, prefs.max_walking_hours), (5, 2));
    }

    #[test]
    fn test_preferences_defaults_when_omitted() {
        let prefs = PreferencesForm::from_pairs(&pairs(&[("interests", "Shopping")]))
            .validate()
            .unwrap();
        assert_eq!(prefs.dietary_preferences, vec![DietaryPreference::NoRestrictions]);
        assert_eq!(prefs.accommodation, AccommodationType::MidRangeHotel);
        assert_eq!(prefs.mobility_concerns, None);
        assert_eq!((prefs.preferred_pace, prefs.max_walking_hours), (3, 4));
    }

    #[rstest]
    #[case(&[], "interests", "Please select at least one interest")]
    #[case(&[("interests", "Museums"), ("preferred_pace", "9")], "preferred_pace", "Pace must be between 1 and 5")]
    #[case(&[("interests", "Museums"), ("max_walking_hours", "0")], "max_walking_hours", "Walking time must be between 1 and 8 hours")]
    #[case(&[("interests", "Museums"), ("preferred_pace", "fast")], "preferred_pace", "Please enter a whole number")]
    #[case(&[("interests", "Skydiving")], "interests", "Unknown option: Skydiving")]
    fn test_preferences_errors(
        #[case] items: &[(&str, &str)],
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let errors = PreferencesForm::from_pairs(&pairs(items))
            .validate()
            .unwrap_err();
        assert_eq!(errors.get(field), Some(message));
    }

    #[test]
    fn test_preferences_round_trip_through_form() {
        let prefs = TripPreferences {
            interests: vec![Interest::ArtsCulture],
            ..TripPreferences::default()
        };
        let form = PreferencesForm::from_preferences(&prefs);
        assert!(form.has_dietary("No Restrictions"));
        assert_eq!(form.validate().unwrap(), prefs);
    }
}
