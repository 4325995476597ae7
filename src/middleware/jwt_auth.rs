//! JWT bearer authentication middleware.
//!
//! Validates `Authorization: Bearer {jwt}` headers issued by the auth
//! service and injects an [`AuthUser`] into request extensions.
//!
//! - `require_auth` rejects the request with 401 when no valid token is present
//! - `attach_auth` never rejects, so public routes can tailor their output
//!   to signed-in callers

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::db::{self, UserRole};
use crate::services::Claims;
use crate::{error::Error, AppState};

/// Authenticated caller, injected into request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Claims of the token used for this request (needed for logout)
    pub claims: Claims,
}

/// Extract the raw token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller behind the request's bearer token.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, Error> {
    let token = bearer_token(headers).ok_or(Error::Unauthenticated)?;
    let claims = state.auth.verify_access_token(token).await?;

    // Tokens outlive deleted users; treat those as invalid
    let user = db::get_user(&state.db, &claims.sub)
        .await
        .map_err(|e| match e {
            Error::NotFound(_) => Error::InvalidToken,
            other => other,
        })?;

    Ok(AuthUser {
        role: user.role_enum(),
        user_id: user.id,
        email: user.email,
        name: user.name,
        claims,
    })
}

/// Middleware that requires a valid, unrevoked access token.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - No bearer token is present
/// - The signature does not verify or the token has expired
/// - The token was revoked by logout or refresh
/// - The token's user no longer exists
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware, routing::post};
///
/// let app = Router::new()
///     .route("/api/campaigns", post(create_campaign))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let user = authenticate(&state, req.headers()).await?;

    tracing::debug!(user_id = %user.user_id, path = %req.uri().path(), "Authenticated request");

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Middleware that attaches an [`AuthUser`] when a valid token is present
/// and passes the request through untouched otherwise.
pub async fn attach_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if bearer_token(req.headers()).is_some() {
        if let Ok(user) = authenticate(&state, req.headers()).await {
            req.extensions_mut().insert(user);
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz"));
    }
}
