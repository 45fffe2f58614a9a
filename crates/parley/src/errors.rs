use thiserror::Error;

/// Errors raised while talking to the language-model runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("runtime request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("runtime server error: {0}")]
    Server(reqwest::StatusCode),

    #[error("runtime rejected request: {0}")]
    Request(String),

    #[error("malformed runtime stream: {0}")]
    Protocol(String),
}

/// Errors a chat request can end in. Capability failures are not represented
/// here: a failed invocation degrades to a `CapabilityOutput::Failure` and
/// flows through the same path as a success.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("message text is required")]
    EmptyRequest,

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("client disconnected before the response completed")]
    Disconnected,
}

pub type ChatResult<T> = Result<T, ChatError>;
