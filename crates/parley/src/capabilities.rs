//! The external capabilities the model may invoke during a generation, and
//! the registry that exposes them by name.

pub mod currency;
pub mod document;
pub mod provider;
pub mod registry;
pub mod weather;

pub use currency::CurrencyProvider;
pub use document::DocumentProvider;
pub use provider::{CapabilityDescriptor, CapabilityProvider};
pub use registry::CapabilityRegistry;
pub use weather::WeatherProvider;

use std::fmt;

/// The fixed set of capabilities this service knows how to invoke. Anything
/// outside this set — a hallucinated tool name, for instance — fails to
/// parse and is dropped by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityName {
    Weather,
    Currency,
    DocumentRead,
}

impl CapabilityName {
    /// The function name advertised to the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityName::Weather => "get_weather",
            CapabilityName::Currency => "convert_currency",
            CapabilityName::DocumentRead => "read_document",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "get_weather" => Some(CapabilityName::Weather),
            "convert_currency" => Some(CapabilityName::Currency),
            "read_document" => Some(CapabilityName::DocumentRead),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
