//! The objects passed between the request pipeline's stages.
//!
//! Three shapes matter here: the inbound request, the event sequence a
//! generation stream produces, and the structured output a capability hands
//! back. Everything is request-scoped; nothing outlives a single call.

pub mod event;
pub mod output;
pub mod request;

pub use event::StreamEvent;
pub use output::{
    CapabilityOutput, CapabilityPayload, CurrencyConversion, DocumentText, TemperatureUnit,
    WeatherReport, WeatherUnits,
};
pub use request::ChatRequest;
