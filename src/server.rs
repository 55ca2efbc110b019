//! HTTP API server over the pipeline.
//!
//! A thin axum layer: routing and status-code mapping only, all behavior
//! lives in [`Pipeline`](crate::pipeline::Pipeline).

use crate::config::Settings;
use crate::error::SvarError;
use crate::pipeline::Pipeline;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
    settings: Settings,
}

/// Build the API router for a pipeline.
pub fn router(pipeline: Pipeline, settings: Settings) -> Router {
    let state = Arc::new(AppState { pipeline, settings });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/video/process", post(process_video))
        .route("/chat", post(chat))
        .route("/search", post(search))
        .route("/transcription", get(transcription))
        .route("/status", get(status))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server until interrupted.
pub async fn serve(host: &str, port: u16, settings: Settings) -> crate::error::Result<()> {
    let pipeline = Pipeline::new(&settings)?;
    let app = router(pipeline, settings);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    /// Video URL to download, transcribe, and index.
    video_url: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    video_title: String,
    transcription_length: usize,
    chunks_created: usize,
}

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
    #[serde(default)]
    max_chunks: Option<usize>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    sources: Vec<ChunkData>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    num_chunks: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    chunks: Vec<ChunkData>,
}

#[derive(Serialize)]
struct ChunkData {
    id: usize,
    text: String,
    start_offset: usize,
    end_offset: usize,
}

impl From<crate::chunking::Chunk> for ChunkData {
    fn from(chunk: crate::chunking::Chunk) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text,
            start_offset: chunk.start_offset,
            end_offset: chunk.end_offset,
        }
    }
}

#[derive(Serialize)]
struct TranscriptionResponse {
    video_title: String,
    transcription: String,
}

#[derive(Serialize)]
struct StatusResponse {
    ready: bool,
    chunk_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_title: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a pipeline error to an HTTP status: caller errors are 4xx, upstream
/// dependency failures are 502, everything else is 500.
fn error_status(err: &SvarError) -> StatusCode {
    if matches!(err, SvarError::NotReady) {
        StatusCode::CONFLICT
    } else if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream_error() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: SvarError) -> axum::response::Response {
    (
        error_status(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    match state.pipeline.process_video(&req.video_url).await {
        Ok(result) => Json(ProcessResponse {
            video_title: result.title,
            transcription_length: result.transcript_chars,
            chunks_created: result.chunk_count,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let k = req.max_chunks.unwrap_or(state.settings.rag.top_k);

    match state.pipeline.query(&req.question, k).await {
        Ok(answer) => Json(ChatResponse {
            answer: answer.text,
            sources: answer.source_chunks.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let k = req.num_chunks.unwrap_or(state.settings.rag.top_k);

    match state.pipeline.search(&req.query, k).await {
        Ok(chunks) => Json(SearchResponse {
            chunks: chunks.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn transcription(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.transcript() {
        Some(t) => Json(TranscriptionResponse {
            video_title: t.title,
            transcription: t.text,
        })
        .into_response(),
        None => error_response(SvarError::NotReady),
    }
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.pipeline.status();
    Json(StatusResponse {
        ready: status.ready,
        chunk_count: status.chunk_count,
        video_title: status.video_title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&SvarError::NotReady), StatusCode::CONFLICT);
        assert_eq!(
            error_status(&SvarError::InvalidInput("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&SvarError::Embedding("down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&SvarError::Config("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
