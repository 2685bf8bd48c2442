pub mod documents;
pub mod health;
pub mod query;

use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{middleware::request_logger, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(documents::ingest_path))
        .route("/documents", post(documents::ingest_text))
        .route("/upload", post(documents::upload))
        .route("/sources/{source_id}", delete(documents::delete_source))
        .route("/query", post(query::query))
        .route("/search", post(query::search))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::{
        AnswerComposer, AnswerPrompts, IngestionPipeline, RagService, RetrievalPipeline,
    };
    use crate::domain::{Chunker, ChunkingConfig};
    use crate::infrastructure::{AppConfig, FileDocumentLoader};
    use crate::testing::{memory_store, HashEmbedder, ScriptedLlm, DIM};

    fn app() -> Router {
        let store = memory_store();
        let embedder = Arc::new(HashEmbedder::new(DIM));
        let chunker = Chunker::new(ChunkingConfig::default()).unwrap();

        let rag = RagService::new(
            IngestionPipeline::new(chunker, embedder.clone(), store.clone()),
            RetrievalPipeline::new(embedder, store.clone(), 5),
            AnswerComposer::new(Arc::new(ScriptedLlm::grounded()), AnswerPrompts::default()),
        );
        let state = AppState::new(
            Arc::new(rag),
            Arc::new(FileDocumentLoader::new()),
            store,
            AppConfig::default(),
        );
        create_router(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app();

        let (status, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(
            &app,
            Request::builder().uri("/ready").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["collection"], "test");
    }

    #[tokio::test]
    async fn test_ingest_then_query() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/documents",
                json!({"source_id": "doc1", "text": "Paris is the capital of France."}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ingested": "doc1"}));

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/query",
                json!({"question": "What is the capital of France?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().unwrap().contains("Paris"));
        assert_eq!(body["sources"], json!(["doc1"]));
        assert_eq!(body["num_contexts"], 1);
    }

    #[tokio::test]
    async fn test_search_returns_contexts() {
        let app = app();
        send(
            &app,
            json_request(
                "POST",
                "/api/v1/documents",
                json!({"source_id": "doc1", "text": "Rust has ownership."}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/search", json!({"question": "ownership", "top_k": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contexts"], json!(["Rust has ownership."]));
        assert_eq!(body["sources"], json!(["doc1"]));
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/query", json!({"question": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_argument");

        let (status, _) = send(
            &app,
            json_request("POST", "/api/v1/query", json!({"question": "q", "top_k": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_missing_path_is_unprocessable() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/ingest",
                json!({"path": "/nonexistent/definitely/missing.txt"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "document_load");
    }

    #[tokio::test]
    async fn test_ingest_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.txt");
        std::fs::write(&path, "The sky is blue.").unwrap();
        let app = app();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/ingest",
                json!({"path": path, "source_id": "facts"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingested"], "facts");
    }

    #[tokio::test]
    async fn test_upload_uses_file_name() {
        let app = app();
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.md\"\r\n\
             Content-Type: text/markdown\r\n\r\n\
             Cats are mammals.\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingested"], "notes.md");
    }

    #[tokio::test]
    async fn test_delete_source() {
        let app = app();
        send(
            &app,
            json_request(
                "POST",
                "/api/v1/documents",
                json!({"source_id": "gone", "text": "Temporary fact."}),
            ),
        )
        .await;

        let (status, _) = send(
            &app,
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/sources/gone")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(
            &app,
            json_request("POST", "/api/v1/search", json!({"question": "Temporary fact"})),
        )
        .await;
        assert_eq!(body["contexts"], json!([]));
    }
}
