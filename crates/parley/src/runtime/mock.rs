//! A scripted runtime for tests: plays back a fixed event sequence, counting
//! opens and capability invocations so tests can assert what never happened.

use async_stream::try_stream;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::base::{EventStream, GenerationRequest, GenerationRuntime};
use crate::errors::RuntimeError;
use crate::models::{CapabilityOutput, StreamEvent};

#[derive(Debug, Clone)]
pub enum MockStep {
    /// Yield this event as-is.
    Event(StreamEvent),
    /// Count an invocation, then yield its result. The counter only moves
    /// when the stream is actually polled this far, which is what lets
    /// cancellation tests prove an invocation never started.
    Invoke {
        name: String,
        output: CapabilityOutput,
    },
    /// Fail mid-stream.
    Fail(String),
}

pub struct MockRuntime {
    script: Mutex<Vec<MockStep>>,
    fail_open: Option<String>,
    opens: Arc<AtomicUsize>,
    invocations: Arc<AtomicUsize>,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockRuntime {
    pub fn new(script: Vec<MockStep>) -> Self {
        Self {
            script: Mutex::new(script),
            fail_open: None,
            opens: Arc::new(AtomicUsize::new(0)),
            invocations: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing_open<S: Into<String>>(message: S) -> Self {
        let mut runtime = Self::new(Vec::new());
        runtime.fail_open = Some(message.into());
        runtime
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// The request the last generation was opened with.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationRuntime for MockRuntime {
    async fn events(&self, request: GenerationRequest) -> Result<EventStream, RuntimeError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        if let Some(message) = &self.fail_open {
            return Err(RuntimeError::Request(message.clone()));
        }

        let steps = std::mem::take(&mut *self.script.lock().unwrap());
        let invocations = self.invocations.clone();

        let stream = try_stream! {
            for step in steps {
                match step {
                    MockStep::Event(event) => yield event,
                    MockStep::Invoke { name, output } => {
                        invocations.fetch_add(1, Ordering::SeqCst);
                        yield StreamEvent::CapabilityResult { name, output };
                    }
                    MockStep::Fail(message) => {
                        Err(RuntimeError::Protocol(message))?;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
