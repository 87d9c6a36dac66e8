//! Weather lookup for the trip dates
//!
//! Weather is decoration: callers go through [`forecast_or_none`], which
//! turns every failure into "no weather panel".

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::Result;
use crate::config::WeatherConfig;
use crate::models::DailyWeather;

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Anything that can produce a daily forecast for a destination
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Forecast for every day from `start` through `end`
    async fn forecast(
        &self,
        destination: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>>;
}

/// Fixed sample values, used with the `demo` key
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleWeather;

#[async_trait]
impl WeatherSource for SampleWeather {
    async fn forecast(
        &self,
        _destination: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyWeather>> {
        Ok(start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(DailyWeather::sample)
            .collect())
    }
}

/// Pick the weather source the configuration asks for
pub fn from_config(config: &WeatherConfig) -> Result<Arc<dyn WeatherSource>> {
    if config.uses_sample_data() {
        info!("Weather API key is 'demo', using sample weather");
        return Ok(Arc::new(SampleWeather));
    }
    Ok(Arc::new(OpenMeteoClient::new(config)?))
}

/// Fetch the forecast, logging and discarding any error
pub async fn forecast_or_none(
    source: &dyn WeatherSource,
    destination: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<Vec<DailyWeather>> {
    match source.forecast(destination, start, end).await {
        Ok(days) if !days.is_empty() => Some(days),
        Ok(_) => {
            warn!("Weather forecast for {destination} was empty");
            None
        }
        Err(e) => {
            warn!("Error fetching weather data for {destination}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TravelAiError;

    struct FailingWeather;

    #[async_trait]
    impl WeatherSource for FailingWeather {
        async fn forecast(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<DailyWeather>> {
            Err(TravelAiError::api("timed out"))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    #[tokio::test]
    async fn test_sample_weather_covers_every_day() {
        let days = SampleWeather.forecast("Paris", day(1), day(3)).await.unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[2].date, day(3));
        assert!(days.iter().all(|d| d.conditions == "Partly Cloudy"));
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        assert!(forecast_or_none(&FailingWeather, "Paris", day(1), day(2)).await.is_none());
        assert!(forecast_or_none(&SampleWeather, "Paris", day(2), day(1)).await.is_none());
    }

    #[test]
    fn test_from_config_demo_key() {
        let config = WeatherConfig {
            api_key: Some("demo".to_string()),
            ..WeatherConfig::default()
        };
        assert!(from_config(&config).is_ok());
        assert!(from_config(&WeatherConfig::default()).is_ok());
    }
}
