use async_trait::async_trait;
use thiserror::Error;

/// The caller hung up. Writes fail fast with this so the orchestrator stops
/// consuming the generation stream at its next suspension point.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("response sink closed")]
pub struct SinkClosed;

/// Where response bytes go. Owned by the transport layer; the core only ever
/// sees "write a chunk" and "end the response".
#[async_trait]
pub trait ResponseSink: Send {
    async fn write(&mut self, chunk: &str) -> Result<(), SinkClosed>;

    /// Ends the response. Called exactly once per request, on every path.
    async fn close(&mut self);
}
