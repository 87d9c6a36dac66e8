//! `OpenMeteo` geocoding and daily forecast client

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::models::DailyWeather;
use crate::{Result, TravelAiError};

const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,temperature_2m_mean,\
relative_humidity_2m_mean,precipitation_probability_max,wind_speed_10m_max";

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

/// Daily forecast response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub daily: Option<DailyData>,
}

/// Daily weather data from `OpenMeteo`, one entry per date in `time`
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_mean")]
    pub temperature_mean: Option<Vec<Option<f32>>>,
    #[serde(rename = "relative_humidity_2m_mean")]
    pub humidity: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_probability_max")]
    pub precipitation_probability: Option<Vec<Option<f32>>>,
    #[serde(rename = "wind_speed_10m_max")]
    pub wind_speed_max: Option<Vec<Option<f32>>>,
    pub weather_code: Option<Vec<Option<u8>>>,
}

fn value_at(series: Option<&Vec<Option<f32>>>, index: usize) -> Option<f32> {
    series.and_then(|values| values.get(index).copied().flatten())
}

impl DailyData {
    /// Convert the column-wise payload into per-day summaries.
    /// Days without min/max temperature are skipped; the mean falls back to
    /// the midpoint and missing extras to zero.
    #[must_use]
    pub fn into_daily_weather(self) -> Vec<DailyWeather> {
        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, date)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                let min_temp = value_at(self.temperature_min.as_ref(), i)?;
                let max_temp = value_at(self.temperature_max.as_ref(), i)?;
                let avg_temp = value_at(self.temperature_mean.as_ref(), i)
                    .unwrap_or((min_temp + max_temp) / 2.0);
                let code = self
                    .weather_code
                    .as_ref()
                    .and_then(|codes| codes.get(i).copied().flatten());

                Some(DailyWeather {
                    date,
                    avg_temp,
                    min_temp,
                    max_temp,
                    humidity: value_at(self.humidity.as_ref(), i).unwrap_or(0.0),
                    precipitation_prob: value_at(self.precipitation_probability.as_ref(), i)
                        .unwrap_or(0.0),
                    wind_speed: value_at(self.wind_speed_max.as_ref(), i).unwrap_or(0.0),
                    conditions: code
                        .map_or("Unknown", weather_code_to_description)
                        .to_string(),
                })
            })
            .collect()
    }
}

/// Convert `OpenMeteo` weather code to human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Live weather: geocode the destination, then fetch the daily forecast
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TravelAI/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TravelAiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
            forecast_url: config.forecast_url.trim_end_matches('/').to_string(),
        })
    }

    /// Best match for a free-text place name
    #[instrument(skip(self))]
    pub async fn geocode(&self, destination: &str) -> Result<GeocodingResult> {
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(destination.trim())
        );

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TravelAiError::api(format!("Geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TravelAiError::api(format!(
                "Geocoding returned {}",
                response.status()
            )));
        }

        let geocoding: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| TravelAiError::api(format!("Failed to parse geocoding response: {e}")))?;

        geocoding
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| TravelAiError::api(format!("No location found for '{destination}'")))
    }

    #[instrument(skip(self))]
    pub async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        let url = format!(
            "{}/forecast?latitude={latitude}&longitude={longitude}&daily={DAILY_FIELDS}\
             &timezone=auto&wind_speed_unit=ms&start_date={}&end_date={}",
            self.forecast_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TravelAiError::api(format!("Forecast request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TravelAiError::api(format!(
                "Forecast returned {status}: {error_text}"
            )));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| TravelAiError::api(format!("Failed to parse forecast response: {e}")))?;

        let days = forecast
            .daily
            .map(DailyData::into_daily_weather)
            .unwrap_or_default();
        if days.is_empty() {
            return Err(TravelAiError::api("Forecast contained no daily data"));
        }
        Ok(days)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn forecast(
        &self,
        destination: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        let place = self.geocode(destination).await?;
        debug!(
            "Resolved '{destination}' to {} ({}) at {:.4}, {:.4}",
            place.name,
            place.country.as_deref().unwrap_or("Unknown"),
            place.latitude,
            place.longitude
        );
        self.daily_forecast(place.latitude, place.longitude, start, end)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_data_conversion() {
        let daily: DailyData = serde_json::from_str(
            r#"{
                "time": ["2026-11-01", "2026-11-02", "2026-11-03"],
                "temperature_2m_max": [20.5, 19.0, null],
                "temperature_2m_min": [10.5, 9.0, 8.0],
                "temperature_2m_mean": [15.0, null, 12.0],
                "relative_humidity_2m_mean": [70, 80, 75],
                "precipitation_probability_max": [10, 55, 0],
                "wind_speed_10m_max": [3.2, 6.1, 2.0],
                "weather_code": [2, 61, 0]
            }"#,
        )
        .unwrap();

        let days = daily.into_daily_weather();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date_key(), "2026-11-01");
        assert_eq!(days[0].avg_temp, 15.0);
        assert_eq!(days[0].conditions, "Partly cloudy");
        assert_eq!(days[1].avg_temp, 14.0);
        assert_eq!(days[1].precipitation_prob, 55.0);
        assert_eq!(days[1].conditions, "Slight rain");
    }

    #[test]
    fn test_missing_optional_series_default() {
        let daily: DailyData = serde_json::from_str(
            r#"{"time":["2026-11-01"],"temperature_2m_max":[5.0],"temperature_2m_min":[1.0]}"#,
        )
        .unwrap();
        let days = daily.into_daily_weather();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].avg_temp, 3.0);
        assert_eq!(days[0].humidity, 0.0);
        assert_eq!(days[0].conditions, "Unknown");
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }
}
