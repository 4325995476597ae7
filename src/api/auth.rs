//! Authentication Routes
//!
//! Routes:
//! - POST /auth/login - Exchange email and password for a JWT
//! - POST /auth/logout - Revoke the presented token (auth)
//! - POST /auth/refresh - Swap a token (possibly expired) for a fresh one
//! - GET /auth/me - Current user (auth)
//! - PUT /auth/password - Change the current user's password (auth)

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{json, Value};

use super::protected;
use crate::{
    db::{self, User},
    error::{Error, Result},
    middleware::{bearer_token, AuthUser},
    services::TokenResponse,
    validation::Validator,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", protected(state, post(logout)))
        .route("/me", protected(state, get(me)))
        .route("/password", protected(state, put(change_password)))
}

async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, Error>,
) -> Result<Json<TokenResponse>> {
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let mut v = Validator::new();
    v.required("email", &email)
        .email("email", Some(email.trim()))
        .required("password", &password);
    v.finish()?;

    Ok(Json(state.auth.login(&email, &password).await?))
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>> {
    state.auth.logout(&user.claims).await?;
    Ok(Json(json!({ "message": "Successfully logged out" })))
}

async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TokenResponse>> {
    let token = bearer_token(&headers).ok_or(Error::Unauthenticated)?;
    Ok(Json(state.auth.refresh(token).await?))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    Ok(Json(db::get_user(&state.db, &user.user_id).await?))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<ChangePasswordRequest>, Error>,
) -> Result<Json<Value>> {
    let current = body.current_password.unwrap_or_default();
    let new = body.new_password.unwrap_or_default();

    let mut v = Validator::new();
    v.required("current_password", &current)
        .required("new_password", &new);
    v.finish()?;

    state
        .auth
        .change_password(&user.user_id, &current, &new)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
