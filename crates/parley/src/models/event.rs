use super::output::CapabilityOutput;

/// One event out of a generation stream, in arrival order. The sequence is
/// finite and not restartable; each request opens a fresh stream.
///
/// Capability names arrive as raw strings because the model may hallucinate
/// tool names; the orchestrator filters them against the known set.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta { text: String },
    CapabilityCallStarted { name: String },
    CapabilityResult { name: String, output: CapabilityOutput },
}

impl StreamEvent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        StreamEvent::TextDelta { text: text.into() }
    }

    pub fn call_started<S: Into<String>>(name: S) -> Self {
        StreamEvent::CapabilityCallStarted { name: name.into() }
    }

    pub fn result<S: Into<String>>(name: S, output: CapabilityOutput) -> Self {
        StreamEvent::CapabilityResult {
            name: name.into(),
            output,
        }
    }
}
