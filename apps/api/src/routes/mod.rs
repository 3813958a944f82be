pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Digest API
        .route("/api/v1/digest", post(handlers::handle_digest))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::generation::pipeline::testing::{article, test_state};
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmError;

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn digest_request(body: &str) -> Request<Body> {
        Request::post("/api/v1/digest")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(vec![], Arc::new(ScriptedGenerator::new(vec![])), None, dir.path());

        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "sarjan");
    }

    #[tokio::test]
    async fn test_digest_rejects_out_of_range_limit() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new(vec![]));
        let state = test_state(vec![article(1, "A")], llm.clone(), None, dir.path());

        let response = build_router(state)
            .oneshot(digest_request(r#"{"limit": 51}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_digest_returns_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Ok(r#"{"Article 1": 4, "Article 2": 8}"#.to_string()),
            Ok(r#"{"twitter_posts": ["Rotate your keys"]}"#.to_string()),
        ]));
        let state = test_state(
            vec![article(1, "A"), article(2, "B")],
            llm,
            None,
            dir.path(),
        );

        let response = build_router(state)
            .oneshot(digest_request(r#"{"style": "professional", "deliver": false}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["articles"][0]["title"], "B");
        assert_eq!(body["articles"][0]["score"], 8);
        assert_eq!(body["ideas"]["twitter_posts"][0], "Rotate your keys");
        assert_eq!(body["degraded"], false);
        assert_eq!(body["delivered"], false);
    }

    #[tokio::test]
    async fn test_digest_rejects_oversized_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new(vec![]));
        let state = test_state(vec![article(1, "A")], llm.clone(), None, dir.path());

        let response = build_router(state)
            .oneshot(digest_request(
                r#"{"deadline_secs": 18446744073709551615, "deliver": false}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_digest_cancelled_model_call_is_gateway_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new(vec![Err(LlmError::Cancelled)]));
        let state = test_state(vec![article(1, "A")], llm, None, dir.path());

        let response = build_router(state)
            .oneshot(digest_request(r#"{"deadline_secs": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
