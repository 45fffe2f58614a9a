use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http,
    response::IntoResponse,
    routing::post,
    Router,
};
use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use parley::errors::ChatError;
use parley::models::ChatRequest;
use parley::orchestrator::Orchestrator;
use parley::sink::{ResponseSink, SinkClosed};

use crate::error::ApiError;
use crate::state::AppState;

/// Streaming plain-text response. No framing between chunks: concatenating
/// them reconstructs the full reply, so any client that can read a body
/// incrementally can render tokens as they arrive.
pub struct TextStreamResponse {
    rx: ReceiverStream<Bytes>,
}

impl TextStreamResponse {
    fn new(rx: ReceiverStream<Bytes>) -> Self {
        Self { rx }
    }
}

impl Stream for TextStreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|opt| opt.map(Ok))
    }
}

impl IntoResponse for TextStreamResponse {
    fn into_response(self) -> axum::response::Response {
        let body = Body::from_stream(self);

        http::Response::builder()
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("Cache-Control", "no-cache")
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap()
    }
}

/// Response sink over the channel feeding the body stream. A failed send
/// means the client hung up; dropping the sender ends the body.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Bytes>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx: Some(tx) }
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn write(&mut self, chunk: &str) -> Result<(), SinkClosed> {
        match &self.tx {
            Some(tx) => tx
                .send(Bytes::copy_from_slice(chunk.as_bytes()))
                .await
                .map_err(|_| SinkClosed),
            None => Err(SinkClosed),
        }
    }

    async fn close(&mut self) {
        self.tx.take();
    }
}

struct Submission {
    message: Option<String>,
    document_path: Option<PathBuf>,
}

async fn read_submission(
    mut multipart: Multipart,
    uploads_dir: &Path,
) -> Result<Submission, ApiError> {
    let mut submission = Submission {
        message: None,
        document_path: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed form data: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("malformed form data: {}", e)))?;
                submission.message = Some(text);
            }
            Some("pdf") | Some("document") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("malformed form data: {}", e)))?;
                tokio::fs::create_dir_all(uploads_dir)
                    .await
                    .map_err(|e| ApiError::Internal(format!("failed to store upload: {}", e)))?;
                let path = uploads_dir.join(format!("{}.pdf", uuid::Uuid::new_v4()));
                tokio::fs::write(&path, &data)
                    .await
                    .map_err(|e| ApiError::Internal(format!("failed to store upload: {}", e)))?;
                tracing::debug!(path = %path.display(), bytes = data.len(), "stored uploaded document");
                submission.document_path = Some(path);
            }
            _ => {}
        }
    }

    Ok(submission)
}

async fn handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<TextStreamResponse, ApiError> {
    let submission = read_submission(multipart, &state.uploads_dir).await?;

    let text = submission.message.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let mut request = ChatRequest::new(text);
    if let Some(path) = submission.document_path {
        request = request.with_document(path);
    }

    tracing::info!(has_document = request.has_document(), "chat request received");

    // Open the generation before committing to a streaming response so
    // validation and backend failures still get a status code.
    let orchestrator = Orchestrator::new(state.runtime.clone(), state.registry.clone());
    let reply = orchestrator.start(request).await.map_err(|e| match e {
        ChatError::EmptyRequest => ApiError::BadRequest(e.to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;

    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut sink = ChannelSink::new(tx);
        match reply.pump(&mut sink).await {
            Ok(()) => {}
            Err(ChatError::Disconnected) => tracing::debug!("client disconnected mid-stream"),
            Err(e) => tracing::error!(error = %e, "chat stream terminated"),
        }
    });

    Ok(TextStreamResponse::new(ReceiverStream::new(rx)))
}

// Uploaded documents are routinely bigger than axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
