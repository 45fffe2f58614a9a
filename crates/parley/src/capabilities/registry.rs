use std::sync::Arc;

use serde_json::Value;

use super::provider::{CapabilityDescriptor, CapabilityProvider};
use super::{CurrencyProvider, DocumentProvider, WeatherProvider};
use crate::models::CapabilityOutput;

/// The set of capabilities available to a request. Constructed once per
/// process and passed by reference into each orchestration call; holds no
/// mutable state.
pub struct CapabilityRegistry {
    providers: Vec<Arc<dyn CapabilityProvider>>,
}

impl CapabilityRegistry {
    pub fn new(providers: Vec<Arc<dyn CapabilityProvider>>) -> Self {
        Self { providers }
    }

    /// The standard three: weather lookup, currency conversion and document
    /// reading, against their production endpoints.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(WeatherProvider::new()),
            Arc::new(CurrencyProvider::new()),
            Arc::new(DocumentProvider::new()),
        ])
    }

    pub fn descriptors(&self) -> Vec<CapabilityDescriptor> {
        self.providers
            .iter()
            .map(|provider| CapabilityDescriptor::for_provider(provider.as_ref()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CapabilityProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.name().as_str() == name)
    }

    /// Dispatch an invocation by wire name. Unknown names degrade to a
    /// failure output rather than an error, like any other bad invocation.
    pub async fn invoke(&self, name: &str, input: Value) -> CapabilityOutput {
        match self.get(name) {
            Some(provider) => {
                tracing::debug!(capability = name, "invoking capability");
                provider.invoke(input).await
            }
            None => {
                tracing::warn!(capability = name, "unknown capability requested");
                CapabilityOutput::failure(format!("Unknown capability: {}", name))
            }
        }
    }
}
