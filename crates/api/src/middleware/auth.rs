//! Bearer authentication middleware.
//!
//! `require_auth` validates the access token and stores the caller's
//! [`AuthContext`] in request extensions. `require_admin` must be layered
//! inside it.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::AuthContext;

use crate::app::AppState;
use crate::error::ApiError;

/// Splits an `Authorization` value into its bearer credential. The scheme is
/// matched case-insensitively.
fn bearer_token(header: &str) -> Result<&str, ApiError> {
    let invalid = || ApiError::Unauthorized("invalid authorization header format".to_string());

    let (scheme, token) = header.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(invalid());
    }
    Ok(token)
}

/// Rejects requests without a valid access token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => value.to_str().unwrap_or_default(),
        None => {
            return ApiError::Unauthorized("missing authorization header".to_string())
                .into_response()
        }
    };

    let token = match bearer_token(header) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    match state.auth.validate_access_token(token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Rejects authenticated callers without the admin role.
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<AuthContext>() {
        Some(auth) if auth.is_admin() => next.run(req).await,
        Some(auth) => {
            tracing::debug!(user_id = %auth.user_id, "Admin role required");
            ApiError::Forbidden("admin role required".to_string()).into_response()
        }
        None => ApiError::Unauthorized("missing authentication context".to_string())
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_accepts_any_scheme_casing() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("BEARER   abc ").unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token_rejects_malformed_values() {
        for value in ["Bearer", "Bearer ", "Basic abc", "abc", ""] {
            match bearer_token(value) {
                Err(ApiError::Unauthorized(msg)) => {
                    assert_eq!(msg, "invalid authorization header format")
                }
                other => panic!("expected rejection for {:?}, got {:?}", value, other),
            }
        }
    }
}
