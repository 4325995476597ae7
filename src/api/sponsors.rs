//! Sponsor Routes
//!
//! Sponsors and partners, ordered for display.
//!
//! Routes:
//! - GET /sponsors - List sponsors (optional `active` and `tier` filters)
//! - POST /sponsors - Create a sponsor (auth)
//! - GET /sponsors/:id - Show a sponsor
//! - PUT /sponsors/:id - Update a sponsor (auth)
//! - DELETE /sponsors/:id - Delete a sponsor (auth)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::info;

use super::{deleted, protected};
use crate::{
    db::{self, Sponsor, SponsorFilter, SponsorInput},
    error::{Error, Result},
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/sponsors",
            get(list_sponsors).merge(protected(state, post(create_sponsor))),
        )
        .route(
            "/sponsors/:id",
            get(show_sponsor).merge(protected(
                state,
                put(update_sponsor)
                    .patch(update_sponsor)
                    .delete(delete_sponsor),
            )),
        )
}

async fn list_sponsors(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<SponsorFilter>, Error>,
) -> Result<Json<Vec<Sponsor>>> {
    Ok(Json(db::list_sponsors(&state.db, &filter).await?))
}

async fn show_sponsor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sponsor>> {
    Ok(Json(db::get_sponsor(&state.db, &id).await?))
}

async fn create_sponsor(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<SponsorInput>, Error>,
) -> Result<(StatusCode, Json<Sponsor>)> {
    let sponsor = db::insert_sponsor(&state.db, &Sponsor::create(input)?).await?;
    info!(sponsor_id = %sponsor.id, "Sponsor created");
    Ok((StatusCode::CREATED, Json(sponsor)))
}

async fn update_sponsor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<SponsorInput>, Error>,
) -> Result<Json<Sponsor>> {
    let sponsor = db::get_sponsor(&state.db, &id).await?.update(input)?;
    let sponsor = db::update_sponsor(&state.db, &sponsor).await?;
    info!(sponsor_id = %sponsor.id, "Sponsor updated");
    Ok(Json(sponsor))
}

async fn delete_sponsor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_sponsor(&state.db, &id).await?;
    info!(sponsor_id = %id, "Sponsor deleted");
    Ok(deleted("Sponsor"))
}
