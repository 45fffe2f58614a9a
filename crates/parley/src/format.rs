//! Deterministic rendering of a capability result into human-readable text,
//! used only when the model produced no narration of its own. Formatting can
//! never fail a request: anything unrenderable degrades to a sentinel string.

use crate::capabilities::CapabilityName;
use crate::models::{CapabilityOutput, CapabilityPayload};

/// How much extracted document text is shown before truncation.
pub const DOCUMENT_PREVIEW_CHARS: usize = 1500;

/// Render the output of `name`. Error-shaped outputs win over everything,
/// regardless of capability; a payload that does not match the capability
/// name resolves to the sentinel.
pub fn format_capability_output(name: CapabilityName, output: &CapabilityOutput) -> String {
    let payload = match output {
        CapabilityOutput::Failure { error } => return format!("Error: {}", error),
        CapabilityOutput::Success(payload) => payload,
    };

    match (name, payload) {
        (CapabilityName::Weather, CapabilityPayload::Weather(report)) => {
            let symbol = report.units.temperature.symbol();
            format!(
                "The weather in {}:\n\n\
                 Temperature: {}{}\n\
                 Feels like: {}{}\n\
                 Humidity: {}%\n\
                 Precipitation: {}{}\n\
                 Wind speed: {} {}",
                report.location,
                report.temperature,
                symbol,
                report.feels_like,
                symbol,
                report.humidity,
                report.precipitation,
                report.units.precipitation,
                report.wind_speed,
                report.units.wind_speed,
            )
        }
        (CapabilityName::Currency, CapabilityPayload::Currency(conversion)) => {
            format!(
                "{} {} equals {:.2} {}\nExchange rate: {} ({})",
                conversion.amount,
                conversion.from,
                round_half_up(conversion.converted),
                conversion.to,
                conversion.rate,
                conversion.timestamp,
            )
        }
        (CapabilityName::DocumentRead, CapabilityPayload::Document(document)) => {
            let preview: String = document.content.chars().take(DOCUMENT_PREVIEW_CHARS).collect();
            let truncated = document.content.chars().count() > DOCUMENT_PREVIEW_CHARS;
            format!(
                "Here's what I found in the document:\n\n{}{}",
                preview,
                if truncated { "..." } else { "" },
            )
        }
        (name, _) => format!("Unable to format response for capability: {}", name),
    }
}

// Presentation rounding only, not a financial-precision guarantee.
fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
