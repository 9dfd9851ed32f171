use axum::body::Body;
use axum::http::{Request, StatusCode};
use livemind::{create_router, AppState, MemoryStore};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    create_router(AppState::new(Arc::new(MemoryStore::new())))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/live/session",
            serde_json::json!({
                "model_name": "test-model",
                "user_id": "user-1",
                "client_identifier": "client-1",
                "device_type": "Desktop",
                "screen_res": "1920x1080",
                "latitude": 52.52,
                "longitude": 13.405
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_responds_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_session_returns_an_id() {
    let app = app();
    let id = create_session(&app).await;
    assert!(id.starts_with("session-"));
}

#[tokio::test]
async fn geolocation_is_optional() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/live/session",
            serde_json::json!({
                "model_name": "test-model",
                "user_id": "user-1",
                "client_identifier": "client-1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn append_and_read_back_messages() {
    let app = app();
    let id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/live/message",
            serde_json::json!({
                "session_id": id,
                "sender": "user",
                "text": "turn left"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/live/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let detail = json_body(response).await;
    assert_eq!(detail["session"]["status"], "active");
    assert_eq!(detail["messages"][0]["sender"], "user");
    assert_eq!(detail["messages"][0]["text"], "turn left");
}

#[tokio::test]
async fn empty_message_text_is_rejected() {
    let app = app();
    let id = create_session(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/live/message",
            serde_json::json!({
                "session_id": id,
                "sender": "model",
                "text": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn close_session_records_terminal_status() {
    let app = app();
    let id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/live/session",
            serde_json::json!({ "id": id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/live/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let detail = json_body(response).await;
    assert_eq!(detail["session"]["status"], "completed");
    assert!(detail["session"]["ended_at"].is_string());
}

#[tokio::test]
async fn user_session_listing_includes_counts() {
    let app = app();
    let id = create_session(&app).await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/live/message",
            serde_json::json!({
                "session_id": id,
                "sender": "model",
                "text": "Hello."
            }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/live/sessions/user/user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = json_body(response).await;
    assert_eq!(listing[0]["id"], serde_json::json!(id));
    assert_eq!(listing[0]["message_count"], 1);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/live/sessions/session-missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
