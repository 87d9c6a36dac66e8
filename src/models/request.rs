//! Travel request model: what the visitor asked for
//!
//! A request is assembled from the two form steps (trip details and
//! preferences) and is read-only once built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of options that are shown, posted and sent to the
/// AI by their human-readable label.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every option, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown in the form and used in prompts
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {}: '{}'", stringify!($name), s))
            }
        }
    };
}

labelled_enum! {
    /// Overall spending tier for the trip
    pub enum BudgetTier {
        Budget => "Budget (Under $1000)",
        Moderate => "Moderate ($1000-$3000)",
        Luxury => "Luxury ($3000+)",
    }
}

labelled_enum! {
    pub enum Interest {
        HistoricalSites => "Historical Sites",
        Museums => "Museums",
        NatureOutdoors => "Nature & Outdoors",
        FoodDining => "Food & Dining",
        Shopping => "Shopping",
        ArtsCulture => "Arts & Culture",
        AdventureSports => "Adventure Sports",
        Relaxation => "Relaxation",
        Nightlife => "Nightlife",
        LocalExperiences => "Local Experiences",
    }
}

labelled_enum! {
    pub enum DietaryPreference {
        NoRestrictions => "No Restrictions",
        Vegetarian => "Vegetarian",
        Vegan => "Vegan",
        Halal => "Halal",
        Kosher => "Kosher",
        GlutenFree => "Gluten-Free",
        Other => "Other",
    }
}

labelled_enum! {
    pub enum AccommodationType {
        BudgetHostel => "Budget Hostel",
        MidRangeHotel => "Mid-range Hotel",
        LuxuryHotel => "Luxury Hotel",
        VacationRental => "Vacation Rental",
        BoutiqueHotel => "Boutique Hotel",
    }
}

impl Default for BudgetTier {
    fn default() -> Self {
        Self::Moderate
    }
}

impl Default for AccommodationType {
    fn default() -> Self {
        Self::MidRangeHotel
    }
}

/// Slider bounds for the preferred pace (1: very relaxed, 5: very active)
pub const PACE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
/// Slider bounds for walking hours per day
pub const WALKING_HOURS_RANGE: std::ops::RangeInclusive<u8> = 1..=8;
/// How far ahead a trip may be planned
pub const MAX_DAYS_AHEAD: i64 = 365;

fn default_pace() -> u8 {
    3
}

fn default_walking_hours() -> u8 {
    4
}

fn default_dietary() -> Vec<DietaryPreference> {
    vec![DietaryPreference::NoRestrictions]
}

/// First form step: where, when and how much
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: BudgetTier,
}

/// Second form step: what the traveller likes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPreferences {
    pub interests: Vec<Interest>,
    #[serde(default = "default_dietary")]
    pub dietary_preferences: Vec<DietaryPreference>,
    #[serde(default)]
    pub accommodation: AccommodationType,
    #[serde(default)]
    pub mobility_concerns: Option<String>,
    #[serde(default = "default_pace")]
    pub preferred_pace: u8,
    #[serde(default = "default_walking_hours")]
    pub max_walking_hours: u8,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            dietary_preferences: default_dietary(),
            accommodation: AccommodationType::default(),
            mobility_concerns: None,
            preferred_pace: default_pace(),
            max_walking_hours: default_walking_hours(),
        }
    }
}

/// A complete, validated trip request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRequest {
    #[serde(flatten)]
    pub details: TripDetails,
    #[serde(flatten)]
    pub preferences: TripPreferences,
}

/// One validation message bound to the form field it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected validation failures of a form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for a field, if any
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl TripDetails {
    /// Number of calendar days covered, both ends included
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Check the details against the date window that starts at `today`
    pub fn validate(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let latest = today + chrono::Duration::days(MAX_DAYS_AHEAD);

        if self.destination.trim().is_empty() {
            errors.push("destination", "Please enter a destination");
        }
        if self.start_date < today {
            errors.push("start_date", "Start date cannot be in the past");
        } else if self.start_date > latest {
            errors.push("start_date", "Start date must be within the next year");
        }
        if self.end_date < self.start_date {
            errors.push("end_date", "End date cannot be before the start date");
        } else if self.end_date > latest {
            errors.push("end_date", "End date must be within the next year");
        }

        errors.into_result()
    }
}

impl TripPreferences {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.interests.is_empty() {
            errors.push("interests", "Please select at least one interest");
        }
        if !PACE_RANGE.contains(&self.preferred_pace) {
            errors.push("preferred_pace", "Pace must be between 1 and 5");
        }
        if !WALKING_HOURS_RANGE.contains(&self.max_walking_hours) {
            errors.push(
                "max_walking_hours",
                "Walking time must be between 1 and 8 hours",
            );
        }

        errors.into_result()
    }
}

impl TravelRequest {
    #[must_use]
    pub fn new(details: TripDetails, preferences: TripPreferences) -> Self {
        Self {
            details,
            preferences,
        }
    }

    #[must_use]
    pub fn duration_days(&self) -> i64 {
        self.details.duration_days()
    }

    /// Validate both steps at once, collecting every problem
    pub fn validate(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(e) = self.details.validate(today) {
            errors.extend(e);
        }
        if let Err(e) = self.preferences.validate() {
            errors.extend(e);
        }
        errors.into_result()
    }
}
