// Router smoke tests. The pool connects lazily, so every request below must be
// answered before any query runs.

use std::sync::Arc;

use advisory_crm::{
    config::{AppState, Config},
    routes::build_router,
    services::{auth::encode_token, mailer::LogMailer},
};
use advisory_crm::models::auth::UserRole;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

fn test_app() -> Router {
    let config = Config {
        database_url: "postgres://localhost/unused".to_string(),
        jwt_secret: SECRET.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 1,
        db_acquire_timeout: std::time::Duration::from_millis(100),
        token_ttl: chrono::Duration::hours(1),
        upload_dir: std::env::temp_dir().join("advisory-crm-router-tests"),
        mail_from: "no-reply@localhost".to_string(),
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .unwrap();

    build_router(AppState::with_pool(pool, &config, Arc::new(LogMailer::new("no-reply@localhost"))))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = test_app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in [
        "/api/users/me",
        "/api/admin/users",
        "/api/advisor/clients",
        "/api/advisor/dashboard/stats",
        "/api/advisor/clients/1/plans",
        "/api/client/profile/income",
        "/api/notifications",
    ] {
        let response = test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["error"], "Missing or invalid authentication token.");
    }
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() {
    let foreign = encode_token("some-other-secret", 1, UserRole::Client, chrono::Duration::hours(1)).unwrap();

    for token in ["not-a-jwt".to_string(), foreign] {
        let response = test_app()
            .oneshot(
                Request::get("/api/client/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn login_validates_before_touching_the_database() {
    let response = test_app()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"not-an-email","password":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["details"]["email"].is_array());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = test_app()
        .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/client/profile/income"]["post"].is_object());
    assert!(doc["paths"]["/api/advisor/dashboard/stats"]["get"].is_object());
    assert!(doc["paths"]["/api/advisor/clients/{id}/plans"]["post"].is_object());
    assert!(doc["paths"]["/api/advisor/tools/income-tax"]["post"].is_object());
    assert!(doc["components"]["schemas"]["IncomeTaxReport"].is_object());
    assert!(doc["components"]["securitySchemes"]["api_jwt"].is_object());
}
