//! Turning Gemini's text output into typed suggestions and itineraries
//!
//! The model is asked for bare JSON but regularly wraps it in markdown
//! fences, adds prose, leaves keys unquoted or stops mid-object when it runs
//! out of tokens. Parsing therefore goes through escalating stages:
//!
//! 1. extract the outermost `{ ... }` slice and try it as-is
//! 2. close any unterminated strings, arrays and objects and try again
//! 3. apply textual repairs (escaped quotes, bare keys, single quotes,
//!    trailing commas, `...` placeholders), with and without closing
//!
//! After that the value is checked for its required keys and converted into
//! the model types. Itineraries get a last semantic pass.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Itinerary, SuggestionSet};
use crate::{Result, TravelAiError};

/// Top-level keys every suggestion response must carry
pub const SUGGESTION_KEYS: &[&str] = &["attractions", "restaurants", "activities"];
/// Top-level keys every itinerary response must carry
pub const ITINERARY_KEYS: &[&str] = &[
    "daily_plans",
    "total_budget",
    "general_tips",
    "emergency_contacts",
];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?[ \t]*\r?\n?").expect("valid regex"));
static DOUBLED_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""{2,}([^"]+)"{2,}"#).expect("valid regex"));
static ESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\+""#).expect("valid regex"));
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid regex")
});
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

fn strip_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text.trim(), "").replace("```", "")
}

/// Strip fences and surrounding prose, keeping the outermost object
pub fn extract_json_object(text: &str) -> Result<String> {
    let text = strip_fences(text);

    let start = text
        .find('{')
        .ok_or_else(|| TravelAiError::parse("No JSON object found in AI response"))?;
    // A response cut off before its final brace still starts an object
    let end = text.rfind('}').filter(|&end| end > start).map_or(text.len(), |end| end + 1);

    Ok(text[start..end].trim().to_string())
}

/// Everything from the first `{` on. A truncated response has no closing
/// brace of its own, so the last `}` may belong to a nested object.
fn json_tail(text: &str) -> Option<String> {
    let text = strip_fences(text);
    let start = text.find('{')?;
    Some(text[start..].trim().to_string())
}

/// Textual repairs for the mistakes models make most often
#[must_use]
pub fn clean_json_text(text: &str) -> String {
    let text = DOUBLED_QUOTES.replace_all(text, "\"$1\"");
    let text = ESCAPED_QUOTE.replace_all(&text, "\"");
    let text = text.replace('\'', "\"").replace("...", "");
    let text = BARE_KEY.replace_all(&text, "$1\"$2\":");
    let text = TRAILING_COMMA.replace_all(&text, "$1");
    text.into_owned()
}

/// Close whatever the text left open: a string, then arrays and objects
/// in reverse order of opening.
#[must_use]
pub fn repair_truncated_json(text: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut repaired = text.trim_end().to_string();
    if in_string {
        repaired.push('"');
    }
    // A dangling separator would still be invalid once closed
    while repaired.ends_with(',') || repaired.ends_with(':') {
        repaired.pop();
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    repaired
}

/// Parse raw AI text into a JSON object carrying every key in `expected_keys`
pub fn parse_json_response(raw: &str, expected_keys: &[&str]) -> Result<Value> {
    let extracted = extract_json_object(raw)?;
    let tail = json_tail(raw).unwrap_or_else(|| extracted.clone());

    let value = match serde_json::from_str::<Value>(&extracted) {
        Ok(value) => value,
        Err(first) => {
            debug!("Direct JSON parse failed ({first}), closing open structures");
            // Closers only: a response that was merely cut off keeps its text intact
            let closed = repair_truncated_json(&tail);
            match serde_json::from_str::<Value>(&closed) {
                Ok(value) => value,
                Err(_) => {
                    warn!("JSON still invalid, applying textual repairs");
                    let cleaned = clean_json_text(&extracted);
                    match serde_json::from_str::<Value>(&cleaned) {
                        Ok(value) => value,
                        Err(_) => {
                            let repaired = repair_truncated_json(&clean_json_text(&tail));
                            serde_json::from_str::<Value>(&repaired).map_err(|e| {
                                TravelAiError::parse(format!(
                                    "JSON parse failed: {e}; text preview: {}",
                                    preview(&repaired)
                                ))
                            })?
                        }
                    }
                }
            }
        }
    };

    validate_json_structure(&value, expected_keys)?;
    Ok(value)
}

/// Check that `value` is an object holding every expected key
pub fn validate_json_structure(value: &Value, expected_keys: &[&str]) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| TravelAiError::parse("AI response is not a JSON object"))?;

    let missing: Vec<&str> = expected_keys
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TravelAiError::parse(format!(
            "Missing required keys: {}",
            missing.join(", ")
        )))
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| TravelAiError::parse(format!("Response does not match the expected schema: {e}")))
}

/// Parse the suggestion step's response
pub fn parse_suggestions(raw: &str) -> Result<SuggestionSet> {
    let value = parse_json_response(raw, SUGGESTION_KEYS)?;
    from_value(value)
}

/// Parse and validate the itinerary step's response
pub fn parse_itinerary(raw: &str) -> Result<Itinerary> {
    let value = parse_json_response(raw, ITINERARY_KEYS)?;
    let mut itinerary: Itinerary = from_value(value)?;
    validate_itinerary(&mut itinerary)?;
    Ok(itinerary)
}

/// Semantic checks the schema cannot express; normalizes activity times
pub fn validate_itinerary(itinerary: &mut Itinerary) -> Result<()> {
    if itinerary.daily_plans.is_empty() {
        return Err(TravelAiError::parse("daily_plans must be a non-empty list"));
    }

    for (index, day) in itinerary.daily_plans.iter_mut().enumerate() {
        let expected = u32::try_from(index + 1).unwrap_or(u32::MAX);
        if day.day != expected {
            return Err(TravelAiError::parse(format!(
                "Day numbers must be sequential. Got {}, expected {expected}",
                day.day
            )));
        }

        if day.activities.is_empty() {
            return Err(TravelAiError::parse(format!(
                "Day {} must have at least one activity",
                day.day
            )));
        }

        for activity in &mut day.activities {
            match normalize_time(&activity.time) {
                Some(time) => activity.time = time,
                None => warn!(
                    day = day.day,
                    time = %activity.time,
                    "Invalid time format, keeping it as given"
                ),
            }
        }
    }

    Ok(())
}

/// Normalize loose time spellings to `HH:MM`.
///
/// Accepts `9`, `9h`, `930`, `0930`, `9:30` and `09:30`; anything else
/// (or an impossible time) yields `None`.
#[must_use]
pub fn normalize_time(raw: &str) -> Option<String> {
    let mut time = raw.trim().trim_matches(|c| c == '"' || c == '\'').to_string();

    if let Some(hours) = time.strip_suffix(['h', 'H']) {
        time = format!("{hours}:00");
    }
    if !time.is_empty() && time.len() <= 2 && time.chars().all(|c| c.is_ascii_digit()) {
        time = format!("{time}:00");
    }
    if !time.contains(':') && time.chars().all(|c| c.is_ascii_digit()) {
        match time.len() {
            3 => time = format!("{}:{}", &time[..1], &time[1..]),
            4 => time = format!("{}:{}", &time[..2], &time[2..]),
            _ => {}
        }
    }

    let (hours, minutes) = time.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let parsed = NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)?;
    Some(parsed.format("%H:%M").to_string())
}

fn preview(text: &str) -> String {
    let cut: String = text.chars().take(200).collect();
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityKind;
    use rstest::rstest;

    const SUGGESTIONS: &str = r#"{"attractions":[{"name":"Louvre","description":"Famous museum","cost":"20EUR","time_needed":"3hours"}],"restaurants":[{"name":"Le Bistro","description":"French food","cost":"30EUR","cuisine":"French"}],"activities":[{"name":"Seine cruise","description":"River tour","cost":"15EUR","time_needed":"1hour"}]}"#;

    const ITINERARY: &str = r#"{"daily_plans":[{"day":1,"date":"2026-11-01","activities":[{"time":"9","duration":"2hours","description":"Visit museum","location":"Louvre","cost":"20EUR","type":"Activity"},{"time":"1230","duration":"1hour","description":"Lunch","location":"Le Bistro","cost":"30EUR","type":"meal"}],"daily_budget":"50EUR","notes":"Easy start"},{"day":2,"date":"2026-11-02","activities":[{"time":"10:00","duration":"1hour","description":"Cruise","location":"Seine cruise","cost":"15EUR","type":"activity"}],"daily_budget":"15EUR"}],"total_budget":"65EUR","general_tips":["Book ahead"],"emergency_contacts":{"police":"17","ambulance":"15"}}"#;

    #[test]
    fn test_parse_valid_suggestions() {
        let set = parse_suggestions(SUGGESTIONS).unwrap();
        assert_eq!(set.attractions[0].name, "Louvre");
        assert_eq!(set.attractions[0].time_needed.as_deref(), Some("3hours"));
        assert_eq!(set.restaurants[0].cuisine.as_deref(), Some("French"));
        assert_eq!(set.activities[0].description, "River tour");
    }

    #[test]
    fn test_parse_suggestions_inside_markdown_and_prose() {
        let raw = format!("Sure! Here is your plan:\n```json\n{SUGGESTIONS}\n```\nEnjoy.");
        let set = parse_suggestions(&raw).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_valid_itinerary_normalizes_times() {
        let itinerary = parse_itinerary(ITINERARY).unwrap();
        assert_eq!(itinerary.day_count(), 2);
        let day1 = &itinerary.daily_plans[0];
        assert_eq!(day1.activities[0].time, "09:00");
        assert_eq!(day1.activities[0].kind, ActivityKind::Activity);
        assert_eq!(day1.activities[1].time, "12:30");
        assert_eq!(day1.notes.as_deref(), Some("Easy start"));
        assert!(itinerary.daily_plans[1].notes.is_none());
        assert_eq!(itinerary.emergency_contacts["police"], "17");
    }

    #[test]
    fn test_repairs_bare_keys_single_quotes_and_trailing_commas() {
        let raw = r#"{attractions: [{'name': 'Louvre', 'description': 'Museum', 'cost': '20EUR',},], restaurants: [], activities: [...]}"#;
        let set = parse_suggestions(raw).unwrap();
        assert_eq!(set.attractions.len(), 1);
        assert_eq!(set.attractions[0].cost, "20EUR");
        assert!(set.activities.is_empty());
    }

    #[test]
    fn test_repairs_over_escaped_quotes() {
        let raw = r#"{\"attractions\":[],\"restaurants\":[],\"activities\":[{\"name\":\"Bike\"}]}"#;
        let set = parse_suggestions(raw).unwrap();
        assert_eq!(set.activities[0].name, "Bike");
    }

    #[test]
    fn test_repairs_truncated_response() {
        let raw = r#"{"attractions":[{"name":"Louvre","description":"Muse"#;
        let value = parse_json_response(raw, &["attractions"]).unwrap();
        assert_eq!(value["attractions"][0]["description"], "Muse");
    }

    #[test]
    fn test_truncated_response_keeps_apostrophes() {
        let raw = r#"{"attractions":[{"name":"Chef's Table","description":"Fine dining"}],"restaurants":[],"activities":["#;
        let set = parse_suggestions(raw).unwrap();
        assert_eq!(set.attractions[0].name, "Chef's Table");
        assert!(set.activities.is_empty());
    }

    #[test]
    fn test_truncated_response_with_bare_keys() {
        let raw = r#"{attractions: [{'name': 'Louvre'}], restaurants: [], activities: [{'name': 'Bike"#;
        let set = parse_suggestions(raw).unwrap();
        assert_eq!(set.activities[0].name, "Bike");
    }

    #[test]
    fn test_repair_closes_in_reverse_order() {
        assert_eq!(repair_truncated_json(r#"{"a":[1,2"#), r#"{"a":[1,2]}"#);
        assert_eq!(repair_truncated_json(r#"{"a":{"b":"x}"#), r#"{"a":{"b":"x}"}}"#);
        assert_eq!(repair_truncated_json(r#"{"a":[1,"#), r#"{"a":[1]}"#);
        assert_eq!(repair_truncated_json(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[rstest]
    #[case::no_json("I cannot help with that.")]
    #[case::not_an_object("[1, 2, 3]")]
    #[case::garbage("{ this is : not ; json ]")]
    fn test_malformed_responses_fail(#[case] raw: &str) {
        let err = parse_suggestions(raw).unwrap_err();
        assert!(matches!(err, TravelAiError::Parse { .. }));
    }

    #[test]
    fn test_missing_keys_are_reported() {
        let err = parse_suggestions(r#"{"attractions":[]}"#).unwrap_err();
        assert!(err.to_string().contains("Missing required keys: restaurants, activities"));
    }

    #[test]
    fn test_schema_mismatch_is_a_parse_error() {
        let err = parse_suggestions(r#"{"attractions":"none","restaurants":[],"activities":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected schema"));
    }

    #[test]
    fn test_itinerary_rejects_non_sequential_days() {
        let raw = ITINERARY.replace(r#""day":2"#, r#""day":3"#);
        let err = parse_itinerary(&raw).unwrap_err();
        assert!(err.to_string().contains("Got 3, expected 2"));
    }

    #[test]
    fn test_itinerary_rejects_empty_day() {
        let raw = r#"{"daily_plans":[{"day":1,"date":"2026-11-01","activities":[],"daily_budget":"0EUR"}],"total_budget":"0EUR","general_tips":[],"emergency_contacts":{}}"#;
        let err = parse_itinerary(raw).unwrap_err();
        assert!(err.to_string().contains("at least one activity"));
    }

    #[test]
    fn test_itinerary_rejects_empty_plan_and_bad_type() {
        let raw = r#"{"daily_plans":[],"total_budget":"0EUR","general_tips":[],"emergency_contacts":{}}"#;
        assert!(parse_itinerary(raw).unwrap_err().to_string().contains("non-empty"));

        let raw = ITINERARY.replace(r#""type":"meal""#, r#""type":"shopping""#);
        assert!(
            parse_itinerary(&raw)
                .unwrap_err()
                .to_string()
                .contains("Invalid activity type")
        );
    }

    #[test]
    fn test_invalid_time_is_kept_verbatim() {
        let raw = ITINERARY.replace(r#""time":"10:00""#, r#""time":"morning""#);
        let itinerary = parse_itinerary(&raw).unwrap();
        assert_eq!(itinerary.daily_plans[1].activities[0].time, "morning");
    }

    #[rstest]
    #[case("09:00", Some("09:00"))]
    #[case("9:30", Some("09:30"))]
    #[case("9", Some("09:00"))]
    #[case("14", Some("14:00"))]
    #[case("9h", Some("09:00"))]
    #[case("930", Some("09:30"))]
    #[case("1400", Some("14:00"))]
    #[case(" \"12:15\" ", Some("12:15"))]
    #[case("25:00", None)]
    #[case("12:75", None)]
    #[case("noon", None)]
    #[case("", None)]
    fn test_normalize_time(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_time(raw).as_deref(), expected);
    }
}
