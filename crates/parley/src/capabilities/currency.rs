//! Exchange-rate conversion against an exchangerate-api style endpoint:
//! one GET for the base currency's rate table, conversion done locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use super::provider::CapabilityProvider;
use super::CapabilityName;
use crate::models::{CapabilityOutput, CapabilityPayload, CurrencyConversion};

pub const EXCHANGE_RATE_HOST: &str = "https://api.exchangerate-api.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct CurrencyProvider {
    client: Client,
    host: String,
}

/// Small models are sloppy about argument names, so the schema's `from`/`to`
/// keys take the common misspellings as aliases rather than failing the call.
#[derive(Debug, Deserialize)]
struct CurrencyInput {
    #[serde(alias = "base_currency", alias = "baseCurrency", alias = "from_currency", alias = "fromCurrency")]
    from: String,
    #[serde(alias = "target_currency", alias = "targetCurrency", alias = "to_currency", alias = "toCurrency")]
    to: String,
    #[serde(default = "default_amount")]
    amount: f64,
}

fn default_amount() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
    date: String,
}

impl CurrencyProvider {
    pub fn new() -> Self {
        Self::with_host(EXCHANGE_RATE_HOST)
    }

    pub fn with_host<S: Into<String>>(host: S) -> Self {
        Self {
            client: Client::new(),
            host: host.into(),
        }
    }

    async fn convert(&self, input: CurrencyInput) -> Result<CurrencyConversion, String> {
        let from = input.from.trim().to_uppercase();
        let to = input.to.trim().to_uppercase();

        let url = format!("{}/v4/latest/{}", self.host.trim_end_matches('/'), from);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Failed to get exchange rate: {}", e))?;

        if !response.status().is_success() {
            return Err("Failed to fetch exchange rates".to_string());
        }

        let rates: RatesResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to get exchange rate: {}", e))?;

        let rate = *rates
            .rates
            .get(&to)
            .ok_or_else(|| format!("Currency {} not found", to))?;

        Ok(CurrencyConversion {
            converted: input.amount * rate,
            amount: input.amount,
            rate,
            timestamp: rates.date,
            from,
            to,
        })
    }
}

impl Default for CurrencyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityProvider for CurrencyProvider {
    fn name(&self) -> CapabilityName {
        CapabilityName::Currency
    }

    fn description(&self) -> &str {
        "Get current exchange rate between two currencies. Use 3-letter currency codes like USD, EUR, BRL, GBP, JPY."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["from", "to"],
            "properties": {
                "from": {
                    "type": "string",
                    "description": "Source currency code (e.g., USD)"
                },
                "to": {
                    "type": "string",
                    "description": "Target currency code (e.g., BRL)"
                },
                "amount": {
                    "type": "number",
                    "description": "Amount to convert (default: 1)"
                }
            }
        })
    }

    async fn invoke(&self, input: Value) -> CapabilityOutput {
        let input: CurrencyInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return CapabilityOutput::failure(format!("Invalid input: {}", e)),
        };
        if input.from.trim().is_empty() || input.to.trim().is_empty() {
            return CapabilityOutput::failure("Invalid input: currency codes must not be empty");
        }

        match self.convert(input).await {
            Ok(conversion) => CapabilityOutput::success(CapabilityPayload::Currency(conversion)),
            Err(error) => CapabilityOutput::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn converts_with_the_fetched_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": {"EUR": 0.91234, "GBP": 0.79},
                "date": "2024-01-01"
            })))
            .mount(&server)
            .await;

        let provider = CurrencyProvider::with_host(server.uri());
        let output = provider
            .invoke(json!({"from": "usd", "to": "eur", "amount": 100}))
            .await;

        match output.payload() {
            Some(CapabilityPayload::Currency(conversion)) => {
                assert_eq!(conversion.from, "USD");
                assert_eq!(conversion.to, "EUR");
                assert_eq!(conversion.rate, 0.91234);
                assert!((conversion.converted - 91.234).abs() < 1e-9);
                assert_eq!(conversion.timestamp, "2024-01-01");
            }
            other => panic!("expected currency payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn aliased_argument_names_are_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": {"BRL": 5.0},
                "date": "2024-01-01"
            })))
            .mount(&server)
            .await;

        let provider = CurrencyProvider::with_host(server.uri());
        let output = provider
            .invoke(json!({"baseCurrency": "USD", "targetCurrency": "BRL"}))
            .await;
        match output.payload() {
            Some(CapabilityPayload::Currency(conversion)) => {
                assert_eq!(conversion.amount, 1.0);
                assert_eq!(conversion.converted, 5.0);
            }
            other => panic!("expected currency payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_target_rate_is_a_failure_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rates": {"EUR": 0.9},
                "date": "2024-01-01"
            })))
            .mount(&server)
            .await;

        let provider = CurrencyProvider::with_host(server.uri());
        let output = provider.invoke(json!({"from": "USD", "to": "XYZ"})).await;
        assert_eq!(output.error(), Some("Currency XYZ not found"));
    }

    #[tokio::test]
    async fn upstream_errors_degrade_to_failure_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = CurrencyProvider::with_host(server.uri());
        let output = provider.invoke(json!({"from": "USD", "to": "EUR"})).await;
        assert_eq!(output.error(), Some("Failed to fetch exchange rates"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = CurrencyProvider::with_host(server.uri());
        let output = provider.invoke(json!({"from": "USD"})).await;
        assert!(output.error().unwrap_or_default().starts_with("Invalid input"));
    }
}
