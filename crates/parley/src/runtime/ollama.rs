//! Streaming generation against an OpenAI-compatible chat-completions
//! endpoint (Ollama in deployment). This runtime owns the tool loop: it
//! demultiplexes the SSE stream, invokes requested capabilities through the
//! registry between rounds, folds their results back into the conversation,
//! and keeps going until the model answers in text.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{EventStream, GenerationRequest, GenerationRuntime};
use super::wire::{self, AssembledCall};
use crate::errors::RuntimeError;
use crate::intent::ForcingPolicy;
use crate::models::StreamEvent;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5:1.5b-instruct-q4_K_M";

// Backstop against a backend that keeps requesting tools; unreachable in
// normal operation.
const MAX_CAPABILITY_ROUNDS: usize = 8;

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: OLLAMA_HOST.to_string(),
            model: OLLAMA_MODEL.to_string(),
        }
    }
}

pub struct OllamaRuntime {
    client: Client,
    config: OllamaConfig,
}

impl OllamaRuntime {
    pub fn new(config: OllamaConfig) -> Result<Self, RuntimeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallFragment>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallFragment {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionFragment>,
}

#[derive(Debug, Default, Deserialize)]
struct FunctionFragment {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Reassembles tool calls from the fragments a streaming backend spreads
/// across deltas (id and name first, arguments drip in afterwards).
#[derive(Default)]
struct CallAssembler {
    calls: Vec<AssembledCall>,
}

impl CallAssembler {
    /// Folds one fragment in; returns the function name when the fragment
    /// starts a call not seen before.
    fn apply(&mut self, fragment: ToolCallFragment) -> Option<String> {
        while self.calls.len() <= fragment.index {
            self.calls.push(AssembledCall {
                id: String::new(),
                name: String::new(),
                arguments: String::new(),
            });
        }
        let call = &mut self.calls[fragment.index];

        if let Some(id) = fragment.id {
            if !id.is_empty() {
                call.id = id;
            }
        }

        let mut started = None;
        if let Some(function) = fragment.function {
            if let Some(name) = function.name {
                if call.name.is_empty() && !name.is_empty() {
                    call.name = name.clone();
                    started = Some(name);
                }
            }
            if let Some(arguments) = function.arguments {
                call.arguments.push_str(&arguments);
            }
        }
        started
    }

    fn finish(self) -> Vec<AssembledCall> {
        self.calls
            .into_iter()
            .filter(|call| !call.name.is_empty())
            .collect()
    }
}

/// Pulls `data:` payloads out of an SSE byte stream, one at a time.
struct SseLines<S> {
    inner: S,
    buffer: Vec<u8>,
}

impl<S, B> SseLines<S>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    async fn next_data(&mut self) -> Result<Option<String>, RuntimeError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(data) = line.trim().strip_prefix("data:") {
                    let data = data.trim();
                    if data == "[DONE]" {
                        return Ok(None);
                    }
                    if !data.is_empty() {
                        return Ok(Some(data.to_string()));
                    }
                }
                continue;
            }
            match self.inner.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => return Err(RuntimeError::Transport(e)),
                None => return Ok(None),
            }
        }
    }
}

async fn open_round(
    client: &Client,
    config: &OllamaConfig,
    messages: &[Value],
    tools: &[Value],
    tool_choice: Value,
    temperature: f32,
) -> Result<reqwest::Response, RuntimeError> {
    let url = format!("{}/v1/chat/completions", config.host.trim_end_matches('/'));

    let mut payload = json!({
        "model": config.model,
        "messages": messages,
        "stream": true,
        "temperature": temperature,
    });
    if !tools.is_empty() {
        if let Some(object) = payload.as_object_mut() {
            object.insert("tools".to_string(), json!(tools));
            object.insert("tool_choice".to_string(), tool_choice);
        }
    }

    let response = client.post(&url).json(&payload).send().await?;

    match response.status() {
        StatusCode::OK => Ok(response),
        status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
            Err(RuntimeError::Server(status))
        }
        status => Err(RuntimeError::Request(format!("request failed: {}", status))),
    }
}

#[async_trait]
impl GenerationRuntime for OllamaRuntime {
    async fn events(&self, request: GenerationRequest) -> Result<EventStream, RuntimeError> {
        let tools = wire::capabilities_to_tools(&request.registry.descriptors());
        let mut messages = vec![
            json!({"role": "system", "content": request.system}),
            json!({"role": "user", "content": request.user_turn}),
        ];

        // Open the first round before returning so the transport can still
        // report connect/status failures as a service error.
        let first = open_round(
            &self.client,
            &self.config,
            &messages,
            &tools,
            wire::tool_choice(request.policy),
            request.temperature,
        )
        .await?;

        let client = self.client.clone();
        let config = self.config.clone();
        let registry = request.registry.clone();
        let temperature = request.temperature;

        let stream = try_stream! {
            let mut response = first;
            for round in 0..MAX_CAPABILITY_ROUNDS {
                let mut lines = SseLines::new(response.bytes_stream());
                let mut assembler = CallAssembler::default();

                while let Some(data) = lines.next_data().await? {
                    let chunk: ChatChunk = serde_json::from_str(&data)
                        .map_err(|e| RuntimeError::Protocol(format!("bad stream chunk: {}", e)))?;
                    let choice = match chunk.choices.into_iter().next() {
                        Some(choice) => choice,
                        None => continue,
                    };
                    if let Some(text) = choice.delta.content {
                        if !text.is_empty() {
                            yield StreamEvent::TextDelta { text };
                        }
                    }
                    for fragment in choice.delta.tool_calls.unwrap_or_default() {
                        if let Some(name) = assembler.apply(fragment) {
                            yield StreamEvent::CapabilityCallStarted { name };
                        }
                    }
                }

                let calls = assembler.finish();
                if calls.is_empty() {
                    break;
                }

                messages.push(wire::assistant_calls_message(&calls));
                for call in &calls {
                    let output = registry.invoke(&call.name, call.arguments_json()).await;
                    messages.push(wire::tool_result_message(call, &output));
                    yield StreamEvent::CapabilityResult {
                        name: call.name.clone(),
                        output,
                    };
                }

                if round + 1 == MAX_CAPABILITY_ROUNDS {
                    tracing::warn!("capability round limit reached, ending generation");
                    break;
                }

                // A forced first call must not force the follow-up round too,
                // or the backend would call tools forever.
                response = open_round(
                    &client,
                    &config,
                    &messages,
                    &tools,
                    wire::tool_choice(ForcingPolicy::Auto),
                    temperature,
                )
                .await?;
            }
        };

        Ok(Box::pin(stream))
    }
}
