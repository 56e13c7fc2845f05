//! Error response handling for authentication middleware.
//!
//! Token failures map to 401 with a `WWW-Authenticate` challenge, missing
//! permissions to 403, store faults to 503.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let code = self.bearer_error_code();
        let message = self.to_string();

        let body = json!({
            "error": code,
            "error_description": message,
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(code, &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        if status.is_server_error() {
            tracing::warn!(category = %self.category(), error = %message, "Auth request failed");
        }

        (status, headers, Json(body)).into_response()
    }
}

fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidToken { .. }
        | AuthError::TokenExpired
        | AuthError::TokenRevoked
        | AuthError::IdentityNotFound { .. }
        | AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Encoding { .. } | AuthError::Configuration { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Format: `Bearer realm="keyward", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('"', "\\\"");
    format!(
        "Bearer realm=\"keyward\", error=\"{}\", error_description=\"{}\"",
        error, escaped_desc
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_unauthorized_response() {
        let response = AuthError::unauthorized("Missing Authorization header").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.starts_with("Bearer realm=\"keyward\""));
        assert!(www_auth.contains("error=\"invalid_request\""));
    }

    #[tokio::test]
    async fn test_token_errors_are_401() {
        for error in [
            AuthError::TokenExpired,
            AuthError::TokenRevoked,
            AuthError::invalid_token("bad"),
            AuthError::identity_not_found("u1"),
        ] {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let www_auth = response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .unwrap()
                .to_str()
                .unwrap();
            assert!(www_auth.contains("error=\"invalid_token\""));
        }
    }

    #[tokio::test]
    async fn test_forbidden_response() {
        let response = AuthError::forbidden("Missing required permission").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_store_unavailable_response() {
        let response = AuthError::store_unavailable("timeout").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = AuthError::TokenRevoked.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "invalid_token");
        assert_eq!(json["error_description"], "Token revoked");
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("invalid_token", "Token contains \"quotes\"");
        assert!(header.contains("\\\"quotes\\\""));
    }
}
