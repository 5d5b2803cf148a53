//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_get_catalog))
        .route("/api/v1/catalog/validation", get(http::http_get_validation))
        .route("/api/v1/quiz", post(http::http_post_quiz))
        .route("/api/v1/quiz/:id", get(http::http_get_progress).delete(http::http_delete_quiz))
        .route("/api/v1/quiz/:id/question", get(http::http_get_question))
        .route("/api/v1/quiz/:id/structure", get(http::http_get_structure))
        .route("/api/v1/quiz/:id/answer", post(http::http_post_answer))
        .route("/api/v1/quiz/:id/explanation", get(http::http_get_explanation))
        .route("/api/v1/quiz/:id/next", post(http::http_post_next))
        .route("/api/v1/quiz/:id/results", get(http::http_get_results))
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
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::bank::QuestionBank;
    use crate::config::Prompts;
    use crate::domain::Category;
    use crate::seeds::seed_compounds;

    fn app_with(bank: QuestionBank) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::with_parts(bank, None, Prompts::default(), Duration::from_secs(1)));
        (build_router(state.clone()), state)
    }

    fn app() -> (Router, Arc<AppState>) {
        app_with(QuestionBank::new(seed_compounds()))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    async fn start(app: &Router, body: Value) -> String {
        let (status, v) = call(app, Method::POST, "/api/v1/quiz", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", v);
        v["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_and_catalog() {
        let (app, state) = app();
        let (status, v) = call(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!((status, v), (StatusCode::OK, json!({ "ok": true })));

        let (status, v) = call(&app, Method::GET, "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["categories"][0]["value"], "alkane");
        assert_eq!(v["total"], state.bank.len());

        let (status, v) = call(&app, Method::GET, "/api/v1/catalog/validation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["invalid"], json!([]));
    }

    #[tokio::test]
    async fn unmatched_filters_are_unprocessable() {
        let alkanes = seed_compounds().into_iter().filter(|c| c.category == Category::Alkane).collect();
        let (app, state) = app_with(QuestionBank::new(alkanes));
        let (status, v) = call(&app, Method::POST, "/api/v1/quiz", Some(json!({ "categories": ["alkene"] }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(v["message"].as_str().unwrap().contains("broaden"));
        assert!(state.sessions.read().await.is_empty());

        let (status, _) = call(&app, Method::POST, "/api/v1/quiz", Some(json!({ "count": 0 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (app, _) = app();
        for uri in ["/api/v1/quiz/nope", "/api/v1/quiz/nope/question", "/api/v1/quiz/nope/results"] {
            let (status, _) = call(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
        let (status, _) = call(&app, Method::POST, "/api/v1/quiz/nope/answer", Some(json!({ "answer": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn answer_flow_to_results() {
        let (app, state) = app();
        let id = start(&app, json!({ "difficulties": ["easy"], "count": 2, "view": "full" })).await;
        let base = format!("/api/v1/quiz/{}", id);

        let (status, _) = call(&app, Method::GET, &format!("{}/results", base), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Question 1: correct, in the student's own casing.
        let name = state.with_session(&id, |s| Ok(s.current_question()?.preferred_name().to_uppercase())).await.unwrap();
        let (status, v) = call(&app, Method::POST, &format!("{}/answer", base), Some(json!({ "answer": name }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["correct"], true);
        assert_eq!(v["explanation"], Value::Null);
        assert_eq!(v["progress"]["score"], 1);

        let (_, v) = call(&app, Method::GET, &format!("{}/explanation", base), None).await;
        assert_eq!(v["explanation"], Value::Null);

        let (status, v) = call(&app, Method::POST, &format!("{}/next", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["status"], "question");
        assert_eq!(v["question"]["progress_text"], "Problem 2 of 2 (Score: 1)");

        // Question 2: wrong; no AI configured so the fallback is served.
        let (_, v) = call(&app, Method::POST, &format!("{}/answer", base), Some(json!({ "answer": "water" }))).await;
        assert_eq!(v["correct"], false);
        assert_eq!(v["explanation"]["source"], "fallback");
        assert!(v["accepted_names"].as_array().map_or(false, |a| !a.is_empty()));

        let (_, v) = call(&app, Method::GET, &format!("{}/explanation", base), None).await;
        assert_eq!(v["explanation"]["text"], crate::explain::FALLBACK_MESSAGE);

        let (_, v) = call(&app, Method::GET, &base, None).await;
        assert_eq!((v["score"].clone(), v["answered"].clone()), (json!(1), json!(2)));

        let (_, v) = call(&app, Method::POST, &format!("{}/next", base), None).await;
        assert_eq!(v["status"], "completed");
        assert_eq!(v["results"]["percentage"], 50.0);
        assert_eq!(v["results"]["tier"], "good_effort");

        let (status, v) = call(&app, Method::GET, &format!("{}/results", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!((v["score"].clone(), v["total"].clone()), (json!(1), json!(2)));

        let (status, _) = call(&app, Method::POST, &format!("{}/answer", base), Some(json!({ "answer": "x" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, Method::DELETE, &base, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, &base, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn structure_serves_raw_content() {
        let (app, _) = app();
        let id = start(&app, json!({ "categories": ["alkane"], "count": 1 })).await;

        let req = Request::builder()
            .uri(format!("/api/v1/quiz/{}/structure?view=skeletal", id))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"<svg"));

        let (status, _) = call(&app, Method::GET, &format!("/api/v1/quiz/{}/structure?view=ball", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
