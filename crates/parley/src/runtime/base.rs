use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::capabilities::CapabilityRegistry;
use crate::errors::RuntimeError;
use crate::intent::ForcingPolicy;
use crate::models::StreamEvent;

/// Everything one generation needs: the fixed system instruction, the
/// prepared user turn, the capabilities the model may call, whether it must
/// call one, and the sampling temperature.
#[derive(Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user_turn: String,
    pub registry: Arc<CapabilityRegistry>,
    pub policy: ForcingPolicy,
    pub temperature: f32,
}

/// The event sequence of one generation. Finite, arrival-ordered, owned by
/// the caller; dropping it abandons the generation and prevents any further
/// capability invocation.
pub type EventStream = BoxStream<'static, Result<StreamEvent, RuntimeError>>;

/// A backend that can run one generation and surface it as events. Opening
/// errors are returned from `events` itself so the transport can still
/// report a status code; everything after that arrives in-stream.
#[async_trait]
pub trait GenerationRuntime: Send + Sync {
    async fn events(&self, request: GenerationRequest) -> Result<EventStream, RuntimeError>;
}
