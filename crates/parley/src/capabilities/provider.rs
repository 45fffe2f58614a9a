use async_trait::async_trait;
use serde_json::Value;

use super::CapabilityName;
use crate::models::CapabilityOutput;

/// What the registry advertises to the model for one capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Contract every external capability satisfies: validated input in,
/// structured success/failure out. Providers hold no per-request state and
/// are shared across all in-flight requests.
///
/// `invoke` never returns a Rust error: transport failures, bad upstream
/// responses and invalid input all degrade to `CapabilityOutput::Failure`,
/// which flows through the same path as a success.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn name(&self) -> CapabilityName;

    fn description(&self) -> &str;

    /// JSON schema for the arguments the model should produce. Input is
    /// validated against the typed form of this schema before any network
    /// resource is contacted.
    fn input_schema(&self) -> Value;

    async fn invoke(&self, input: Value) -> CapabilityOutput;
}

impl CapabilityDescriptor {
    pub fn for_provider(provider: &dyn CapabilityProvider) -> Self {
        Self {
            name: provider.name().as_str().to_string(),
            description: provider.description().to_string(),
            input_schema: provider.input_schema(),
        }
    }
}
