//! API Routes for Outreach
//!
//! This module combines all API routes into a single router.
//! Reads of public content are open; every write goes through
//! `require_auth` via [`protected`].

mod auth;
mod blog;
mod campaigns;
mod contact;
mod dashboard;
mod gallery;
mod projects;
mod sponsors;
pub mod status;
mod stories;
mod team;

use axum::middleware::from_fn_with_state;
use axum::routing::MethodRouter;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::middleware::{attach_auth, require_auth};
use crate::AppState;

/// Build the complete router.
///
/// Route structure:
/// - /health, /metrics - Health checks and Prometheus exposition (public)
/// - /api/auth/* - Login, logout, refresh, current user, password change
/// - /api/{campaigns,sponsors,blog,stories,projects,team,gallery} - Content CRUD
/// - /api/contact - Public submissions, admin inbox
/// - /api/gallery-scan, /api/uploads - Public storage management (admin)
/// - /api/dashboard/stats - Admin dashboard figures
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/api", api_routes(&state))
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes(state))
        .merge(campaigns::routes(state))
        .merge(sponsors::routes(state))
        .merge(blog::routes(state))
        .merge(stories::routes(state))
        .merge(projects::routes(state))
        .merge(team::routes(state))
        .merge(gallery::routes(state))
        .merge(contact::routes(state))
        .merge(dashboard::routes(state))
}

/// Require a valid token for every method in `router`.
///
/// Applied per method router so public and protected verbs can share a path:
///
/// ```rust,ignore
/// .route("/campaigns", get(list).merge(protected(state, post(create))))
/// ```
pub(crate) fn protected(state: &AppState, router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Attach the caller when a valid token is present, without requiring one.
pub(crate) fn identified(state: &AppState, router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), attach_auth))
}

/// Body returned by every successful DELETE.
pub(crate) fn deleted(resource: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted successfully", resource) }))
}
