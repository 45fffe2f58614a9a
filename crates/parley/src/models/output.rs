use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// What a capability invocation produced. A failure always carries an error
/// message and never a payload; a success always carries a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityOutput {
    Success(CapabilityPayload),
    Failure { error: String },
}

impl CapabilityOutput {
    pub fn success(payload: CapabilityPayload) -> Self {
        CapabilityOutput::Success(payload)
    }

    pub fn failure<S: Into<String>>(error: S) -> Self {
        CapabilityOutput::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CapabilityOutput::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CapabilityOutput::Failure { error } => Some(error),
            CapabilityOutput::Success(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&CapabilityPayload> {
        match self {
            CapabilityOutput::Success(payload) => Some(payload),
            CapabilityOutput::Failure { .. } => None,
        }
    }

    /// The wire shape handed back to the model as a tool result.
    pub fn to_json(&self) -> Value {
        match self {
            CapabilityOutput::Success(payload) => {
                let mut value = json!(payload);
                if let Some(object) = value.as_object_mut() {
                    object.insert("success".to_string(), json!(true));
                }
                value
            }
            CapabilityOutput::Failure { error } => json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

/// Capability-specific result payloads, tagged by the capability that
/// produced them. The tag is what the fallback formatter dispatches on, so
/// no field-presence probing is ever needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityPayload {
    Weather(WeatherReport),
    Currency(CurrencyConversion),
    Document(DocumentText),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// The unit name the forecast API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        TemperatureUnit::Celsius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherUnits {
    pub temperature: TemperatureUnit,
    pub wind_speed: String,
    pub precipitation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub units: WeatherUnits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub converted: f64,
    pub rate: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentText {
    pub content: String,
    pub pages: usize,
}
