//! Admin authentication middleware.
//!
//! Admin routes are protected by a static token sent in the `X-Admin-Token`
//! header. Only the token's SHA-256 digest is held in configuration; the
//! comparison hashes the presented value and matches digests. When no digest
//! is configured the check is disabled (development mode).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Middleware for admin-only routes.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected_digest) = state.config.security.admin_token_sha256.as_deref() else {
        // No token configured: admin surface is open (development mode)
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(token) if token_matches(token, expected_digest) => next.run(req).await,
        _ => unauthorized_response(),
    }
}

/// Compares the SHA-256 of the presented token against the configured digest.
fn token_matches(presented: &str, expected_digest: &str) -> bool {
    shared::crypto::sha256_hex(presented).eq_ignore_ascii_case(expected_digest)
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": "Invalid or missing admin token"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        let digest = shared::crypto::sha256_hex("secret-token");
        assert!(token_matches("secret-token", &digest));
        assert!(!token_matches("wrong-token", &digest));
    }

    #[test]
    fn test_token_matches_case_insensitive_digest() {
        let digest = shared::crypto::sha256_hex("secret-token").to_uppercase();
        assert!(token_matches("secret-token", &digest));
    }

    #[test]
    fn test_unauthorized_response_status() {
        let response = unauthorized_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
