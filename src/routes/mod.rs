//! Router assembly: HTTP endpoints, WebSocket chat, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket chat at `/ws?user=<id>`
/// - JSON API under `/api/v1/...`, one resource tree per user
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/users/:user_id/today", get(http::http_get_today))
        .route("/api/v1/users/:user_id/refresh", post(http::http_post_refresh))
        .route("/api/v1/users/:user_id/preference", put(http::http_put_preference))
        .route("/api/v1/users/:user_id/credential", put(http::http_put_credential))
        .route("/api/v1/users/:user_id/solved", get(http::http_get_solved))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{AppConfig, StorageBackend};
    use crate::orchestrator::tests::{catalog, StaticFetcher};

    fn app() -> Router {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Memory;
        cfg.sampling.seed = Some(1);
        let state = AppState::with_fetcher(&cfg, Arc::new(StaticFetcher::ok(catalog())));
        build_router(Arc::new(state))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = call(&app(), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn missing_configuration_and_credential_are_412() {
        let app = app();
        let (status, body) = call(&app, "GET", "/api/v1/users/7/today", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], "configuration_missing");

        let (status, body) = call(&app, "POST", "/api/v1/users/7/refresh", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], "credential_missing");
    }

    #[tokio::test]
    async fn blank_credential_is_400_and_refresh_still_needs_one() {
        let app = app();
        let (status, body) = call(&app, "PUT", "/api/v1/users/7/credential", Some(json!({ "token": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "blank_credential");

        let (status, body) = call(&app, "POST", "/api/v1/users/7/refresh", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], "credential_missing");
    }

    #[tokio::test]
    async fn refresh_select_and_tally() {
        let app = app();
        let (status, _) = call(&app, "PUT", "/api/v1/users/7/credential", Some(json!({ "token": "cookie" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "POST", "/api/v1/users/7/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "notSolvedCount": 3, "solvedCount": 2 }));

        let (status, _) =
            call(&app, "PUT", "/api/v1/users/7/preference", Some(json!({ "easy": 0, "medium": 1, "hard": 1 }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/api/v1/users/7/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "problems": [ {
                "title": "M1",
                "titleSlug": "m1",
                "difficulty": "Medium",
                "url": "https://leetcode.com/problems/m1/"
            } ] })
        );

        let (_, body) = call(&app, "GET", "/api/v1/users/7/solved", None).await;
        assert_eq!(body, json!({ "Easy": 1, "Medium": 0, "Hard": 1 }));

        let (_, body) = call(&app, "GET", "/api/v1/users/8/solved", None).await;
        assert_eq!(body, json!({ "Easy": 0, "Medium": 0, "Hard": 0 }));
    }

    #[tokio::test]
    async fn failed_fetch_is_bad_gateway() {
        let app = app();
        call(&app, "PUT", "/api/v1/users/7/credential", Some(json!({ "token": "cookie" }))).await;
        call(&app, "POST", "/api/v1/users/7/refresh", None).await;
        // The canned catalog is single-use; a second refresh sees nothing.
        let (status, body) = call(&app, "POST", "/api/v1/users/7/refresh", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "fetch_failed");
    }
}
