//! Current-conditions lookup backed by the Open-Meteo geocoding and forecast
//! APIs. Two round trips: resolve the location name to coordinates, then
//! fetch the current conditions in the requested unit system.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::provider::CapabilityProvider;
use super::CapabilityName;
use crate::models::{
    CapabilityOutput, CapabilityPayload, TemperatureUnit, WeatherReport, WeatherUnits,
};

pub const GEOCODING_HOST: &str = "https://geocoding-api.open-meteo.com";
pub const FORECAST_HOST: &str = "https://api.open-meteo.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct WeatherProvider {
    client: Client,
    geocoding_host: String,
    forecast_host: String,
}

#[derive(Debug, Deserialize)]
struct WeatherInput {
    #[serde(alias = "city")]
    location: String,
    #[serde(default)]
    units: TemperatureUnit,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    precipitation: f64,
    wind_speed_10m: f64,
}

impl WeatherProvider {
    pub fn new() -> Self {
        Self::with_hosts(GEOCODING_HOST, FORECAST_HOST)
    }

    /// Point both APIs somewhere else, e.g. a mock server in tests.
    pub fn with_hosts<G: Into<String>, F: Into<String>>(geocoding: G, forecast: F) -> Self {
        Self {
            client: Client::new(),
            geocoding_host: geocoding.into(),
            forecast_host: forecast.into(),
        }
    }

    async fn lookup(&self, input: WeatherInput) -> Result<WeatherReport, String> {
        let geocoding_url = format!(
            "{}/v1/search?name={}&count=1&language=en&format=json",
            self.geocoding_host.trim_end_matches('/'),
            urlencoding::encode(input.location.trim()),
        );

        let geocoding: GeocodingResponse = self
            .client
            .get(&geocoding_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Failed to get weather: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Failed to get weather: {}", e))?;

        let place = geocoding
            .results
            .into_iter()
            .next()
            .ok_or_else(|| format!("Location \"{}\" not found", input.location.trim()))?;

        let forecast_url = format!(
            "{}/v1/forecast?latitude={}&longitude={}\
             &current=temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,wind_speed_10m\
             &temperature_unit={}",
            self.forecast_host.trim_end_matches('/'),
            place.latitude,
            place.longitude,
            input.units.as_str(),
        );

        let forecast: ForecastResponse = self
            .client
            .get(&forecast_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Failed to get weather: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Failed to get weather: {}", e))?;

        Ok(WeatherReport {
            location: format!("{}, {}", place.name, place.country),
            temperature: forecast.current.temperature_2m,
            feels_like: forecast.current.apparent_temperature,
            humidity: forecast.current.relative_humidity_2m,
            precipitation: forecast.current.precipitation,
            wind_speed: forecast.current.wind_speed_10m,
            units: WeatherUnits {
                temperature: input.units,
                wind_speed: "km/h".to_string(),
                precipitation: "mm".to_string(),
            },
        })
    }
}

impl Default for WeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityProvider for WeatherProvider {
    fn name(&self) -> CapabilityName {
        CapabilityName::Weather
    }

    fn description(&self) -> &str {
        "Get current weather information for a specific location"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["location"],
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name (e.g., \"New York\", \"São Paulo\", \"London\")"
                },
                "units": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "default": "celsius"
                }
            }
        })
    }

    async fn invoke(&self, input: Value) -> CapabilityOutput {
        let input: WeatherInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return CapabilityOutput::failure(format!("Invalid input: {}", e)),
        };
        if input.location.trim().is_empty() {
            return CapabilityOutput::failure("Invalid input: location must not be empty");
        }

        match self.lookup(input).await {
            Ok(report) => CapabilityOutput::success(CapabilityPayload::Weather(report)),
            Err(error) => CapabilityOutput::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_geocoding(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn successful_lookup_produces_a_weather_report() {
        let server = MockServer::start().await;
        mock_geocoding(
            &server,
            json!({"results": [{"latitude": 51.5, "longitude": -0.12, "name": "London", "country": "United Kingdom"}]}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("temperature_unit", "celsius"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "temperature_2m": 15.0,
                    "apparent_temperature": 13.0,
                    "relative_humidity_2m": 60.0,
                    "precipitation": 0.0,
                    "wind_speed_10m": 10.0
                }
            })))
            .mount(&server)
            .await;

        let provider = WeatherProvider::with_hosts(server.uri(), server.uri());
        let output = provider.invoke(json!({"location": "London"})).await;

        match output.payload() {
            Some(CapabilityPayload::Weather(report)) => {
                assert_eq!(report.location, "London, United Kingdom");
                assert_eq!(report.temperature, 15.0);
                assert_eq!(report.units.temperature, TemperatureUnit::Celsius);
            }
            other => panic!("expected weather payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_locations_fail_without_a_forecast_call() {
        let server = MockServer::start().await;
        mock_geocoding(&server, json!({"results": []})).await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = WeatherProvider::with_hosts(server.uri(), server.uri());
        let output = provider.invoke(json!({"location": "Atlantis"})).await;
        assert_eq!(output.error(), Some("Location \"Atlantis\" not found"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = WeatherProvider::with_hosts(server.uri(), server.uri());
        let output = provider.invoke(json!({"units": "celsius"})).await;
        assert!(output.error().unwrap_or_default().starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn fahrenheit_is_passed_through_to_the_forecast_api() {
        let server = MockServer::start().await;
        mock_geocoding(
            &server,
            json!({"results": [{"latitude": 40.7, "longitude": -74.0, "name": "New York", "country": "United States"}]}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {
                    "temperature_2m": 59.0,
                    "apparent_temperature": 55.0,
                    "relative_humidity_2m": 40.0,
                    "precipitation": 0.2,
                    "wind_speed_10m": 6.0
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherProvider::with_hosts(server.uri(), server.uri());
        let output = provider
            .invoke(json!({"location": "New York", "units": "fahrenheit"}))
            .await;
        match output.payload() {
            Some(CapabilityPayload::Weather(report)) => {
                assert_eq!(report.units.temperature, TemperatureUnit::Fahrenheit);
            }
            other => panic!("expected weather payload, got {:?}", other),
        }
    }
}
