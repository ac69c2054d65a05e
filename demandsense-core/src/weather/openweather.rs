use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{error::WeatherError, model::WeatherReading};

use super::WeatherSource;

/// Live weather from the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    base_url: String,
    api_key: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherReading, WeatherError> {
        tracing::debug!(city, url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        if status != StatusCode::OK {
            tracing::debug!(%status, body = %truncate_body(&body), "weather lookup rejected");
            return Err(WeatherError::NotFound);
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let primary = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("response contained no weather entries".into()))?;

        Ok(WeatherReading {
            location: parsed.name,
            temperature_c: parsed.main.temp,
            condition: primary.main,
            description: Some(primary.description),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        self.fetch_current(location).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn source(server: &MockServer) -> OpenWeatherSource {
        OpenWeatherSource::new(server.url("/data/2.5/weather"), "TEST_KEY".to_string())
    }

    #[tokio::test]
    async fn parses_successful_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/data/2.5/weather")
                    .query_param("q", "Vadodara")
                    .query_param("appid", "TEST_KEY")
                    .query_param("units", "metric");
                then.status(200).json_body(json!({
                    "name": "Vadodara",
                    "main": { "temp": 31.4, "humidity": 70 },
                    "weather": [
                        { "main": "Rain", "description": "light rain" },
                        { "main": "Mist", "description": "mist" }
                    ]
                }));
            })
            .await;

        let reading = source(&server).current("Vadodara").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reading.location, "Vadodara");
        assert_eq!(reading.temperature_c, 31.4);
        assert_eq!(reading.condition, "Rain");
        assert_eq!(reading.description.as_deref(), Some("light rain"));
    }

    #[tokio::test]
    async fn non_200_is_city_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/2.5/weather");
                then.status(404).json_body(json!({ "cod": "404", "message": "city not found" }));
            })
            .await;

        let err = source(&server).current("Atlantis").await.unwrap_err();

        assert!(matches!(err, WeatherError::NotFound));
        assert_eq!(err.to_string(), "City not found.");
    }

    #[tokio::test]
    async fn other_success_codes_are_not_found_too() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/2.5/weather");
                then.status(204);
            })
            .await;

        let err = source(&server).current("Vadodara").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/2.5/weather");
                then.status(200).body("not json");
            })
            .await;

        let err = source(&server).current("Vadodara").await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn empty_weather_list_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/2.5/weather");
                then.status(200).json_body(json!({
                    "name": "Vadodara",
                    "main": { "temp": 20.0 },
                    "weather": []
                }));
            })
            .await;

        let err = source(&server).current("Vadodara").await.unwrap_err();
        assert!(err.to_string().contains("no weather entries"));
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let source = OpenWeatherSource::new("http://127.0.0.1:1/weather".into(), "KEY".into());

        let err = source.current("Vadodara").await.unwrap_err();
        assert!(matches!(err, WeatherError::Request(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let out = truncate_body(&long);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
