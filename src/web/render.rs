//! Server-side HTML rendering for the planner pages

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::forms::{DetailsForm, PreferencesForm};
use crate::models::weather::weather_for_date;
use crate::models::{
    AccommodationType, ActivityKind, BudgetTier, DailyWeather, DietaryPreference, FieldErrors,
    Interest, Itinerary, ItineraryDay, MAX_DAYS_AHEAD, PACE_RANGE, ScheduledActivity,
    SuggestionItem, SuggestionSet, WALKING_HOURS_RANGE,
};
use crate::session::{PlannerSession, Step, Theme};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; }
body.light { background: #ffffff; color: #1f2933; }
body.dark { background: #0e1117; color: #fafafa; }
aside { width: 16rem; padding: 1rem; border-right: 1px solid #8884; min-height: 100vh; }
main { flex: 1; padding: 1.5rem 2.5rem; max-width: 60rem; }
.banner { padding: .75rem 1rem; border-radius: .4rem; margin: .5rem 0; }
.banner.error { background: #fde2e2; color: #8a1c1c; }
.banner.warning { background: #fff4d6; color: #7a5200; }
.field-error { color: #c0392b; margin: .2rem 0 .6rem; }
.columns { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
.card { border: 1px solid #8884; border-radius: .4rem; padding: .6rem; margin-bottom: .6rem; }
.metrics { display: flex; gap: 1.5rem; margin: .5rem 0; }
.metric span { display: block; font-size: .8rem; opacity: .7; }
.timeline { position: relative; height: 1.2rem; background: #8882; margin: .3rem 0; }
.timeline div { position: absolute; top: 0; height: 100%; border-radius: .2rem; }
.activity { background: #FF9999; } .meal { background: #99FF99; } .transport { background: #9999FF; }
nav button { display: block; width: 100%; margin: .2rem 0; text-align: left; }
nav button.current { font-weight: bold; }
"#;

/// Escape text for use in HTML content and quoted attributes
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything a page render needs besides the session itself
#[derive(Debug, Default)]
pub struct PageContext<'a> {
    pub today: NaiveDate,
    /// Rejected details submission to show again
    pub details_form: Option<(&'a DetailsForm, &'a FieldErrors)>,
    /// Rejected preferences submission to show again
    pub preferences_form: Option<(&'a PreferencesForm, &'a FieldErrors)>,
}

fn layout(title: &str, theme: Theme, sidebar: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body class=\"{}\">\n<aside>{sidebar}</aside>\n<main>\n\
         <header><h1>AI Travel Planner</h1><h3>Your Personal AI-Powered Travel Assistant</h3></header>\n\
         {body}\n</main>\n</body>\n</html>\n",
        escape(title),
        theme.as_str(),
    )
}

fn action(session: &PlannerSession, path: &str) -> String {
    format!("/trips/{}/{path}", escape(&session.id))
}

fn sidebar(session: &PlannerSession) -> String {
    let toggle_label = match session.theme {
        Theme::Light => "Dark Theme",
        Theme::Dark => "Light Theme",
    };
    let max_step = session.max_step();

    let mut html = format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\">Toggle {toggle_label}</button></form>\n",
        action(session, "theme")
    );
    html.push_str("<h2>Navigation</h2>\n<nav>\n");
    html.push_str(&format!(
        "<form method=\"post\" action=\"{}\">\n",
        action(session, "step")
    ));
    for step in Step::ALL {
        let class = if step == session.step { " class=\"current\"" } else { "" };
        let disabled = if step > max_step { " disabled" } else { "" };
        html.push_str(&format!(
            "<button type=\"submit\" name=\"step\" value=\"{}\"{class}{disabled}>{}. {}</button>\n",
            step.slug(),
            step.number(),
            step.title()
        ));
    }
    html.push_str("</form>\n</nav>\n<hr>\n<h3>About</h3>\n");
    html.push_str(
        "<p>This AI-powered travel planner helps you create personalized travel \
         itineraries based on your preferences and requirements.</p>\n",
    );
    html.push_str(&format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\">Start Over</button></form>\n",
        action(session, "reset")
    ));
    html
}

fn banners(session: &PlannerSession) -> String {
    let mut html = String::new();
    if let Some(message) = &session.error_message {
        html.push_str(&format!(
            "<div class=\"banner error\" role=\"alert\">{}\
             <form method=\"post\" action=\"{}\"><button type=\"submit\">Clear Error</button></form></div>\n",
            escape(message),
            action(session, "error/clear")
        ));
    }
    for notice in &session.notices {
        html.push_str(&format!(
            "<div class=\"banner warning\">{}</div>\n",
            escape(notice)
        ));
    }
    html
}

fn progress(step: Step) -> String {
    format!(
        "<progress value=\"{}\" max=\"{}\"></progress>\n",
        step.number(),
        Step::ALL.len()
    )
}

fn field_error(errors: Option<&FieldErrors>, field: &str) -> String {
    errors
        .and_then(|e| e.get(field))
        .map(|message| format!("<p class=\"field-error\">{}</p>\n", escape(message)))
        .unwrap_or_default()
}

fn select_options<T: Copy + PartialEq + std::fmt::Display>(
    options: &[T],
    selected: &str,
) -> String {
    options
        .iter()
        .map(|option| {
            let label = option.to_string();
            let mark = if label.eq_ignore_ascii_case(selected) { " selected" } else { "" };
            format!(
                "<option value=\"{0}\"{mark}>{0}</option>",
                escape(&label)
            )
        })
        .collect()
}

fn checkboxes<T: Copy + std::fmt::Display>(
    name: &str,
    options: &[T],
    is_checked: impl Fn(&str) -> bool,
) -> String {
    options
        .iter()
        .map(|option| {
            let label = option.to_string();
            let mark = if is_checked(&label) { " checked" } else { "" };
            format!(
                "<label><input type=\"checkbox\" name=\"{name}\" value=\"{0}\"{mark}> {0}</label><br>\n",
                escape(&label)
            )
        })
        .collect()
}

fn details_step(session: &PlannerSession, ctx: &PageContext<'_>) -> String {
    let stored;
    let (form, errors) = match ctx.details_form {
        Some((form, errors)) => (form, Some(errors)),
        None => {
            stored = session
                .details
                .as_ref()
                .map_or_else(|| DetailsForm::blank(ctx.today), DetailsForm::from_details);
            (&stored, None)
        }
    };
    let min = ctx.today.format("%Y-%m-%d");
    let max = (ctx.today + Duration::days(MAX_DAYS_AHEAD)).format("%Y-%m-%d");

    format!(
        "<h2>Basic Travel Details</h2>\n<form method=\"post\" action=\"{action}\">\n\
         <label for=\"destination\">Destination</label><br>\n\
         <input id=\"destination\" name=\"destination\" value=\"{destination}\" \
         placeholder=\"Enter the city or location you want to visit\"><br>\n{destination_error}\
         <label for=\"start_date\">Start Date</label><br>\n\
         <input id=\"start_date\" type=\"date\" name=\"start_date\" value=\"{start}\" min=\"{min}\" max=\"{max}\"><br>\n{start_error}\
         <label for=\"end_date\">End Date</label><br>\n\
         <input id=\"end_date\" type=\"date\" name=\"end_date\" value=\"{end}\" min=\"{min}\" max=\"{max}\"><br>\n{end_error}\
         <label for=\"budget\">Budget Range</label><br>\n\
         <select id=\"budget\" name=\"budget\">{budget_options}</select><br>\n{budget_error}\
         <button type=\"submit\">Save &amp; Continue</button>\n</form>\n",
        action = action(session, "details"),
        destination = escape(&form.destination),
        destination_error = field_error(errors, "destination"),
        start = escape(&form.start_date),
        start_error = field_error(errors, "start_date"),
        end = escape(&form.end_date),
        end_error = field_error(errors, "end_date"),
        budget_options = select_options(BudgetTier::ALL, &form.budget),
        budget_error = field_error(errors, "budget"),
    )
}

fn preferences_step(session: &PlannerSession, ctx: &PageContext<'_>) -> String {
    let stored;
    let (form, errors) = match ctx.preferences_form {
        Some((form, errors)) => (form, Some(errors)),
        None => {
            stored = session
                .preferences
                .as_ref()
                .map_or_else(PreferencesForm::default, PreferencesForm::from_preferences);
            (&stored, None)
        }
    };

    format!(
        "<h2>Travel Preferences</h2>\n<form method=\"post\" action=\"{action}\">\n\
         <fieldset><legend>Travel Interests (Select multiple)</legend>\n{interests}</fieldset>\n{interests_error}\
         <fieldset><legend>Dietary Preferences (Select multiple)</legend>\n{dietary}</fieldset>\n{dietary_error}\
         <label for=\"accommodation\">Preferred Accommodation Type</label><br>\n\
         <select id=\"accommodation\" name=\"accommodation\">{accommodation}</select><br>\n{accommodation_error}\
         <label for=\"mobility_concerns\">Mobility Concerns or Special Requirements</label><br>\n\
         <textarea id=\"mobility_concerns\" name=\"mobility_concerns\">{mobility}</textarea><br>\n\
         <label for=\"preferred_pace\">Preferred Pace (1: Very Relaxed, 5: Very Active)</label><br>\n\
         <input id=\"preferred_pace\" type=\"range\" name=\"preferred_pace\" min=\"{pace_min}\" max=\"{pace_max}\" value=\"{pace}\"><br>\n{pace_error}\
         <label for=\"max_walking_hours\">Maximum Walking Time (hours/day)</label><br>\n\
         <input id=\"max_walking_hours\" type=\"range\" name=\"max_walking_hours\" min=\"{walk_min}\" max=\"{walk_max}\" value=\"{walking}\"><br>\n{walking_error}\
         <button type=\"submit\">Save &amp; Continue</button>\n</form>\n",
        action = action(session, "preferences"),
        interests = checkboxes("interests", Interest::ALL, |label| form.has_interest(label)),
        interests_error = field_error(errors, "interests"),
        dietary = checkboxes("dietary_preferences", DietaryPreference::ALL, |label| {
            form.has_dietary(label)
        }),
        dietary_error = field_error(errors, "dietary_preferences"),
        accommodation = select_options(AccommodationType::ALL, &form.accommodation),
        accommodation_error = field_error(errors, "accommodation"),
        mobility = escape(&form.mobility_concerns),
        pace_min = PACE_RANGE.start(),
        pace_max = PACE_RANGE.end(),
        pace = escape(&form.preferred_pace),
        pace_error = field_error(errors, "preferred_pace"),
        walk_min = WALKING_HOURS_RANGE.start(),
        walk_max = WALKING_HOURS_RANGE.end(),
        walking = escape(&form.max_walking_hours),
        walking_error = field_error(errors, "max_walking_hours"),
    )
}

fn suggestion_card(item: &SuggestionItem) -> String {
    let extra = item
        .cuisine
        .as_deref()
        .map(|c| format!("Cuisine: {}", escape(c)))
        .or_else(|| {
            item.time_needed
                .as_deref()
                .map(|t| format!("Time: {}", escape(t)))
        })
        .unwrap_or_default();
    format!(
        "<div class=\"card\"><strong>{}</strong><br>{}<br>Cost: {} {}</div>\n",
        escape(&item.name),
        escape(&item.description),
        escape(&item.cost),
        if extra.is_empty() { String::new() } else { format!("| {extra}") }
    )
}

fn suggestions_view(suggestions: &SuggestionSet) -> String {
    let mut html = String::from("<h3>Suggested Activities</h3>\n<div class=\"columns\">\n");
    for (title, items) in suggestions.categories() {
        html.push_str(&format!("<section><h4>{title}</h4>\n"));
        for item in items {
            html.push_str(&suggestion_card(item));
        }
        html.push_str("</section>\n");
    }
    html.push_str("</div>\n");
    html
}

fn generate_step(session: &PlannerSession) -> String {
    let mut html = String::from("<h2>Generating Your Itinerary</h2>\n");
    if let Some(request) = session.request() {
        html.push_str(&format!(
            "<p>{} from {} to {} ({} days), {}</p>\n",
            escape(&request.details.destination),
            request.details.start_date,
            request.details.end_date,
            request.duration_days(),
            escape(request.details.budget.label())
        ));
    }
    html.push_str(&format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\">Get Suggestions</button></form>\n",
        action(session, "suggestions")
    ));

    if let Some(suggestions) = &session.suggestions {
        html.push_str(&suggestions_view(suggestions));
        html.push_str(
            "<hr>\n<p>Please review the suggestions and click below to generate your itinerary.</p>\n",
        );
        html.push_str(&format!(
            "<form method=\"post\" action=\"{}\"><button type=\"submit\">Generate Itinerary</button></form>\n",
            action(session, "itinerary")
        ));
    }
    html
}

fn weather_metrics(weather: &DailyWeather) -> String {
    format!(
        "<div class=\"metrics\">\
         <div class=\"metric\"><span>Temperature</span>{}</div>\
         <div class=\"metric\"><span>Conditions</span>{}</div>\
         <div class=\"metric\"><span>Humidity</span>{}</div>\
         <div class=\"metric\"><span>Rain Chance</span>{}</div></div>\n",
        weather.format_temperature(),
        escape(&weather.conditions),
        weather.format_humidity(),
        weather.format_rain_chance()
    )
}

/// Position and width of an activity on a 24h bar, in percent
fn timeline_span(activity: &ScheduledActivity) -> Option<(f32, f32)> {
    let start = NaiveTime::parse_from_str(&activity.time, "%H:%M").ok()?;
    let minutes = (start.hour() * 60 + start.minute()) as f32;
    let hours = activity.duration_hours().unwrap_or(1).max(1) as f32;
    let left = minutes / 1440.0 * 100.0;
    let width = (hours * 60.0 / 1440.0 * 100.0).min(100.0 - left);
    Some((left, width))
}

fn kind_class(kind: ActivityKind) -> &'static str {
    kind.as_str()
}

fn day_view(day: &ItineraryDay, weather: Option<&[DailyWeather]>) -> String {
    let open = if day.day == 1 { " open" } else { "" };
    let mut html = format!(
        "<details{open}><summary>Day {} - {}</summary>\n",
        day.day,
        escape(&day.date)
    );

    if let Some(w) = weather.and_then(|w| weather_for_date(w, &day.date)) {
        html.push_str(&weather_metrics(w));
    }

    html.push_str("<div class=\"timeline\">");
    for activity in &day.activities {
        if let Some((left, width)) = timeline_span(activity) {
            html.push_str(&format!(
                "<div class=\"{}\" style=\"left:{left:.2}%;width:{width:.2}%\" title=\"{}\"></div>",
                kind_class(activity.kind),
                escape(&format!("{} - {}", activity.description, activity.location))
            ));
        }
    }
    html.push_str("</div>\n");

    for activity in &day.activities {
        html.push_str(&format!(
            "<div class=\"card {}\"><strong>{} - {}</strong><br>Location: {} | Duration: {} | Cost: {}</div>\n",
            kind_class(activity.kind),
            escape(&activity.time),
            escape(&activity.description),
            escape(&activity.location),
            escape(&activity.duration),
            escape(&activity.cost)
        ));
    }

    html.push_str(&format!(
        "<p>Daily Budget: {}</p>\n",
        escape(&day.daily_budget)
    ));
    if let Some(notes) = day.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        html.push_str(&format!("<p><strong>Notes:</strong> {}</p>\n", escape(notes)));
    }
    html.push_str("</details>\n");
    html
}

fn weather_tab(weather: Option<&[DailyWeather]>) -> String {
    let Some(days) = weather.filter(|w| !w.is_empty()) else {
        return "<p>No weather data available.</p>\n".to_string();
    };

    let mut html = String::from(
        "<table>\n<tr><th>Date</th><th>Avg Temp</th><th>Min / Max</th><th>Conditions</th>\
         <th>Wind Speed</th><th>Rain Chance</th></tr>\n",
    );
    for day in days {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            day.date_key(),
            day.format_temperature(),
            day.format_range(),
            escape(&day.conditions),
            day.format_wind(),
            day.format_rain_chance()
        ));
    }
    html.push_str("</table>\n");
    html
}

/// "tourist_police" -> "Tourist Police"
fn service_title(service: &str) -> String {
    service
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary_tab(session: &PlannerSession, itinerary: &Itinerary) -> String {
    let mut html = format!(
        "<div class=\"metric\"><span>Total Budget</span>{}</div>\n<h3>Travel Tips</h3>\n<ul>\n",
        escape(&itinerary.total_budget)
    );
    for tip in &itinerary.general_tips {
        html.push_str(&format!("<li>{}</li>\n", escape(tip)));
    }
    html.push_str("</ul>\n<h3>Emergency Contacts</h3>\n<div class=\"metrics\">\n");
    for (service, number) in &itinerary.emergency_contacts {
        html.push_str(&format!(
            "<div class=\"metric\"><span>{}</span>{}</div>\n",
            escape(&service_title(service)),
            escape(number)
        ));
    }
    html.push_str(&format!(
        "</div>\n<p><a href=\"{}\" download=\"travel_itinerary.json\">Download Itinerary</a></p>\n",
        action(session, "itinerary.json")
    ));
    html
}

fn plan_step(session: &PlannerSession) -> String {
    let Some(itinerary) = &session.itinerary else {
        return "<h2>Your Personalized Travel Itinerary</h2>\n\
                <p>Please generate an itinerary first.</p>\n"
            .to_string();
    };
    let weather = session.weather.as_deref();

    let mut html = String::from(
        "<h2>Your Personalized Travel Itinerary</h2>\n\
         <p><a href=\"#plan\">Day-by-Day Plan</a> | <a href=\"#weather\">Weather Forecast</a> | \
         <a href=\"#summary\">Summary</a></p>\n<section id=\"plan\">\n",
    );
    for day in &itinerary.daily_plans {
        html.push_str(&day_view(day, weather));
    }
    html.push_str("</section>\n<section id=\"weather\"><h3>Weather Forecast</h3>\n");
    html.push_str(&weather_tab(weather));
    html.push_str("</section>\n<section id=\"summary\"><h3>Summary</h3>\n");
    html.push_str(&summary_tab(session, itinerary));
    html.push_str("</section>\n");
    html
}

/// Full page for the session's current step
#[must_use]
pub fn page(session: &PlannerSession, ctx: &PageContext<'_>) -> String {
    let mut body = banners(session);
    body.push_str(&progress(session.step));
    body.push_str(&match session.step {
        Step::Details => details_step(session, ctx),
        Step::Preferences => preferences_step(session, ctx),
        Step::Generate => generate_step(session),
        Step::Plan => plan_step(session),
    });
    layout(session.step.title(), session.theme, &sidebar(session), &body)
}

/// Error page with a link back to a fresh session
#[must_use]
pub fn error_page(title: &str, message: &str) -> String {
    layout(
        title,
        Theme::default(),
        "",
        &format!(
            "<h2>{}</h2>\n<p>{}</p>\n<p><a href=\"/\">Start a new plan</a></p>\n",
            escape(title),
            escape(message)
        ),
    )
}
