use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use super::*;
use crate::services::token::{self, TokenKind};
use crate::state::test_helpers::test_app_state;

fn router() -> Router {
    app(test_app_state()).expect("test router should build")
}

fn access_token() -> String {
    token::issue(Uuid::new_v4(), TokenKind::Access, &test_app_state().config.jwt).expect("token should sign")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("body should collect").to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn authed(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", access_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request should build")
}

#[test]
fn list_response_counts_items() {
    let list = ListResponse::from(vec![1, 2, 3]);
    assert_eq!(list.total, 3);
    let value = serde_json::to_value(&list).unwrap();
    assert_eq!(value, serde_json::json!({ "items": [1, 2, 3], "total": 3 }));
}

#[tokio::test]
async fn health_is_public() {
    let response = router()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn protected_routes_require_token() {
    for uri in ["/api/v1/goals", "/api/v1/progress", "/api/v1/moodboard", "/api/v1/achievements", "/api/v1/reflections"] {
        let response = router().oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let config = test_app_state().config;
    let refresh = token::issue(Uuid::new_v4(), TokenKind::Refresh, &config.jwt).unwrap();
    let request = Request::get("/api/v1/goals")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn auth_is_checked_before_path_parsing() {
    let response = router()
        .oneshot(Request::get("/api/v1/goals/not-a-uuid").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_path_id_is_validation_error() {
    let response = router().oneshot(authed("GET", "/api/v1/goals/not-a-uuid", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_json_is_validation_error() {
    let response = router().oneshot(authed("POST", "/api/v1/goals", "{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn past_year_goal_create_is_rejected() {
    let year = crate::services::current_year() - 1;
    let body = serde_json::json!({ "description": "too late", "year": year }).to_string();
    let response = router().oneshot(authed("POST", "/api/v1/goals", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "PAST_YEAR_CREATE");
    assert_eq!(body["error"]["message"], "cannot create goals in past years");
}

#[tokio::test]
async fn bad_item_content_is_rejected() {
    let uri = format!("/api/v1/moodboard/{}/items", Uuid::new_v4());
    let body = r#"{"type":"image_upload","content":"https://example.com/a.png"}"#;
    let response = router().oneshot(authed("POST", &uri, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/goals")
        .header(header::ORIGIN, "http://localhost:5174")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5174");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn invalid_cors_origin_fails_router_build() {
    let mut state = test_app_state();
    let mut config = (*state.config).clone();
    config.cors_origin = "http://bad\norigin".into();
    state.config = std::sync::Arc::new(config);
    assert!(app(state).is_err());
}
