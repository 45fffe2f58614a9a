//! Trigger-pattern routing from raw request text to an implied capability.
//!
//! This is a heuristic, not a parser. A false negative leaves the decision to
//! the model (`Auto`); a false positive forces a capability call the model
//! must still interpret.

use lazy_static::lazy_static;
use regex::Regex;

use crate::capabilities::CapabilityName;

/// Whether the model may or must invoke a capability during the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcingPolicy {
    Auto,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedIntent {
    pub capability: Option<CapabilityName>,
    pub policy: ForcingPolicy,
}

lazy_static! {
    static ref WEATHER: Regex = Regex::new(r"(?i)weather|temperature|clima").unwrap();
    static ref CURRENCY: Regex = Regex::new(r"(?i)convert|currency|euro|dollar").unwrap();
}

/// Match the request against the trigger families in fixed priority order:
/// weather, then currency, then an attached document. The currency triggers
/// additionally need a digit in the text, so a passing mention of "the euro"
/// does not force a conversion.
pub fn route(text: &str, has_document: bool) -> RoutedIntent {
    let capability = if WEATHER.is_match(text) {
        Some(CapabilityName::Weather)
    } else if CURRENCY.is_match(text) && text.bytes().any(|b| b.is_ascii_digit()) {
        Some(CapabilityName::Currency)
    } else if has_document {
        Some(CapabilityName::DocumentRead)
    } else {
        None
    };

    let policy = if capability.is_some() {
        ForcingPolicy::Required
    } else {
        ForcingPolicy::Auto
    };

    RoutedIntent { capability, policy }
}
