//! Drives one generation to completion: routes the intent, prepares the
//! prompt, opens the event stream, forwards narrated text to the response
//! sink in arrival order, and falls back to deterministic formatting of the
//! last capability result when the model never narrated.

use std::sync::Arc;

use futures::StreamExt;

use crate::capabilities::{CapabilityName, CapabilityRegistry};
use crate::errors::{ChatError, ChatResult};
use crate::format::format_capability_output;
use crate::intent;
use crate::models::{CapabilityOutput, ChatRequest, StreamEvent};
use crate::prompt::{render_user_turn, PromptAnnotation, SYSTEM_INSTRUCTION};
use crate::runtime::{EventStream, GenerationRequest, GenerationRuntime};
use crate::sink::ResponseSink;

/// Sampling temperature for every generation. Low on purpose: the fallback
/// formatter depends on predictable capability payloads, so determinism here
/// is a correctness concern, not a style preference.
const GENERATION_TEMPERATURE: f32 = 0.1;

pub struct Orchestrator {
    runtime: Arc<dyn GenerationRuntime>,
    registry: Arc<CapabilityRegistry>,
}

/// A capability result retained during one stream. Every recognized result
/// is kept in order, but only the last is ever rendered — one user intent,
/// one capability. A multi-step generation that never narrates will only
/// surface its final result.
struct PendingResult {
    name: CapabilityName,
    output: CapabilityOutput,
}

impl Orchestrator {
    pub fn new(runtime: Arc<dyn GenerationRuntime>, registry: Arc<CapabilityRegistry>) -> Self {
        Self { runtime, registry }
    }

    /// Validate the request and open the generation stream. Failures here
    /// happen before any byte reaches the caller, so the transport can still
    /// answer with a proper status code.
    pub async fn start(&self, request: ChatRequest) -> ChatResult<Reply> {
        if request.text.trim().is_empty() {
            return Err(ChatError::EmptyRequest);
        }

        let routed = intent::route(&request.text, request.has_document());
        let annotation = match routed.capability {
            Some(CapabilityName::Weather) => Some(PromptAnnotation::Weather),
            Some(CapabilityName::Currency) => Some(PromptAnnotation::Currency),
            Some(CapabilityName::DocumentRead) => request
                .document_path
                .clone()
                .map(|path| PromptAnnotation::DocumentRead { path }),
            None => None,
        };
        let user_turn = render_user_turn(&request.text, annotation.as_ref());

        tracing::debug!(
            capability = ?routed.capability,
            policy = ?routed.policy,
            "routed chat request"
        );

        let events = self
            .runtime
            .events(GenerationRequest {
                system: SYSTEM_INSTRUCTION.to_string(),
                user_turn,
                registry: self.registry.clone(),
                policy: routed.policy,
                temperature: GENERATION_TEMPERATURE,
            })
            .await?;

        Ok(Reply { events })
    }
}

/// An opened generation, ready to be pumped into a sink.
pub struct Reply {
    events: EventStream,
}

impl Reply {
    /// Consume the event stream, writing narrated text through immediately
    /// and falling back to the formatter when the model stayed silent. The
    /// sink is closed exactly once, whatever path the stream takes.
    pub async fn pump<S: ResponseSink + ?Sized>(mut self, sink: &mut S) -> ChatResult<()> {
        let outcome = drive(&mut self.events, sink).await;
        sink.close().await;
        outcome
    }
}

async fn drive<S: ResponseSink + ?Sized>(
    events: &mut EventStream,
    sink: &mut S,
) -> ChatResult<()> {
    let mut narrated = false;
    let mut pending: Vec<PendingResult> = Vec::new();

    while let Some(event) = events.next().await {
        match event {
            Ok(StreamEvent::TextDelta { text }) => {
                narrated = true;
                if sink.write(&text).await.is_err() {
                    tracing::debug!("client disconnected, abandoning generation");
                    return Err(ChatError::Disconnected);
                }
            }
            Ok(StreamEvent::CapabilityCallStarted { name }) => {
                tracing::debug!(capability = %name, "capability call started");
            }
            Ok(StreamEvent::CapabilityResult { name, output }) => match CapabilityName::parse(&name)
            {
                Some(name) => pending.push(PendingResult { name, output }),
                None => {
                    tracing::warn!(capability = %name, "dropping result for unrecognized capability")
                }
            },
            Err(e) => {
                // Mid-stream failure: the status code is already on the wire,
                // so terminate without emitting an error payload.
                tracing::error!(error = %e, "generation stream failed mid-flight");
                return Err(e.into());
            }
        }
    }

    if !narrated {
        if let Some(last) = pending.last() {
            let rendered = format_capability_output(last.name, &last.output);
            if sink.write(&rendered).await.is_err() {
                return Err(ChatError::Disconnected);
            }
        }
    }

    Ok(())
}
