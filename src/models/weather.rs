//! Daily weather model and display methods

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecast summary for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    /// Mean temperature in Celsius
    pub avg_temp: f32,
    /// Minimum temperature in Celsius
    pub min_temp: f32,
    /// Maximum temperature in Celsius
    pub max_temp: f32,
    /// Relative humidity in percent
    pub humidity: f32,
    /// Precipitation probability in percent
    pub precipitation_prob: f32,
    /// Wind speed in m/s
    pub wind_speed: f32,
    /// Human-readable description of weather conditions
    pub conditions: String,
}

impl DailyWeather {
    /// Sample day served when the weather key is `demo`
    #[must_use]
    pub fn sample(date: NaiveDate) -> Self {
        Self {
            date,
            avg_temp: 22.0,
            min_temp: 18.0,
            max_temp: 26.0,
            humidity: 65.0,
            precipitation_prob: 20.0,
            wind_speed: 12.0,
            conditions: "Partly Cloudy".to_string(),
        }
    }

    /// Date in the `YYYY-MM-DD` form used by itinerary days
    #[must_use]
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.avg_temp)
    }

    #[must_use]
    pub fn format_range(&self) -> String {
        format!("{:.1}°C / {:.1}°C", self.min_temp, self.max_temp)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:.0}%", self.humidity)
    }

    #[must_use]
    pub fn format_rain_chance(&self) -> String {
        format!("{:.0}%", self.precipitation_prob)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed)
    }
}

/// Weather entry matching an itinerary date, if the forecast covers it
#[must_use]
pub fn weather_for_date<'a>(forecast: &'a [DailyWeather], date: &str) -> Option<&'a DailyWeather> {
    forecast.iter().find(|w| w.date_key() == date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_sample_values() {
        let w = DailyWeather::sample(day("2026-11-01"));
        assert_eq!(w.format_temperature(), "22.0°C");
        assert_eq!(w.format_range(), "18.0°C / 26.0°C");
        assert_eq!(w.format_humidity(), "65%");
        assert_eq!(w.format_rain_chance(), "20%");
        assert_eq!(w.format_wind(), "12.0 m/s");
        assert_eq!(w.conditions, "Partly Cloudy");
    }

    #[test]
    fn test_weather_for_date() {
        let forecast = vec![
            DailyWeather::sample(day("2026-11-01")),
            DailyWeather::sample(day("2026-11-02")),
        ];
        assert_eq!(
            weather_for_date(&forecast, "2026-11-02").map(|w| w.date),
            Some(day("2026-11-02"))
        );
        assert!(weather_for_date(&forecast, "2026-11-03").is_none());
        assert!(weather_for_date(&forecast, "not-a-date").is_none());
    }
}
