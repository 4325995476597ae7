//! Dashboard Routes
//!
//! Routes:
//! - GET /dashboard/stats - Content counts, fundraising totals and recent messages (auth)

use axum::{extract::State, routing::get, Json, Router};

use super::protected;
use crate::{
    db::{self, DashboardStats},
    error::Result,
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new().route("/dashboard/stats", protected(state, get(stats)))
}

async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(db::dashboard_stats(&state.db).await?))
}
