//! Bearer extractor tests through an axum router.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    routing::get,
};
use keyward_auth::prelude::*;
use tower::ServiceExt;

const SECRET: &str = "integration-secret-0123456789abcdef";

async fn whoami(BearerAuth(auth): BearerAuth) -> String {
    auth.subject().to_string()
}

async fn delete_data(BearerAuth(auth): BearerAuth) -> Result<&'static str, AuthError> {
    auth.require_permission(Permission::DataDelete)?;
    Ok("deleted")
}

async fn maybe(OptionalBearerAuth(auth): OptionalBearerAuth) -> String {
    auth.map(|a| a.subject().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

fn setup() -> (Router, Arc<TokenService>) {
    let provider = InMemoryIdentityProvider::with_identities([
        Identity::new("u-admin", "ada", "admin"),
        Identity::new("u-student", "sam", "student"),
    ]);
    let service = Arc::new(
        TokenService::new(
            AuthConfig::with_secret(SECRET),
            Arc::new(InMemoryRevocationStore::new()),
            Arc::new(provider),
        )
        .unwrap(),
    );

    let app = Router::new()
        .route("/whoami", get(whoami))
        .route("/data", get(delete_data))
        .route("/maybe", get(maybe))
        .with_state(AuthState::new(service.clone()));

    (app, service)
}

fn request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_valid_token_is_accepted() {
    let (app, service) = setup();
    let pair = service.issue_for_subject("u-student").await.unwrap();

    let response = app
        .oneshot(request("/whoami", Some(&pair.access_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"u-student");
}

#[tokio::test]
async fn test_missing_header_is_401() {
    let (app, _) = setup();
    let response = app.oneshot(request("/whoami", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_revoked_token_is_401() {
    let (app, service) = setup();
    let pair = service.issue_for_subject("u-student").await.unwrap();
    service.revoke(&pair.access_token).await.unwrap();

    let response = app
        .oneshot(request("/whoami", Some(&pair.access_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error_description"], "Token revoked");
}

#[tokio::test]
async fn test_refresh_token_is_not_a_bearer_credential() {
    let (app, service) = setup();
    let pair = service.issue_for_subject("u-student").await.unwrap();

    let response = app
        .oneshot(request("/whoami", Some(&pair.refresh_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permission_gate() {
    let (app, service) = setup();

    let student = service.issue_for_subject("u-student").await.unwrap();
    let response = app
        .clone()
        .oneshot(request("/data", Some(&student.access_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = service.issue_for_subject("u-admin").await.unwrap();
    let response = app
        .oneshot(request("/data", Some(&admin.access_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_optional_auth() {
    let (app, service) = setup();

    let response = app.clone().oneshot(request("/maybe", None)).await.unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"anonymous");

    let pair = service.guest_issue().unwrap();
    let response = app
        .oneshot(request("/maybe", Some(&pair.access_token)))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"guest_"));
}
