//! Campaign Routes
//!
//! Fundraising campaigns shown on the public site.
//!
//! Routes:
//! - GET /campaigns - List campaigns (optional `status` filter)
//! - POST /campaigns - Create a campaign (auth)
//! - GET /campaigns/:id - Show a campaign
//! - PUT /campaigns/:id - Update a campaign (auth)
//! - DELETE /campaigns/:id - Delete a campaign (auth)

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
    db::{self, Campaign, CampaignFilter, CampaignInput},
    error::{Error, Result},
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/campaigns",
            get(list_campaigns).merge(protected(state, post(create_campaign))),
        )
        .route(
            "/campaigns/:id",
            get(show_campaign).merge(protected(
                state,
                put(update_campaign)
                    .patch(update_campaign)
                    .delete(delete_campaign),
            )),
        )
}

async fn list_campaigns(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<CampaignFilter>, Error>,
) -> Result<Json<Vec<Campaign>>> {
    Ok(Json(db::list_campaigns(&state.db, &filter).await?))
}

async fn show_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>> {
    Ok(Json(db::get_campaign(&state.db, &id).await?))
}

async fn create_campaign(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CampaignInput>, Error>,
) -> Result<(StatusCode, Json<Campaign>)> {
    let campaign = db::insert_campaign(&state.db, &Campaign::create(input)?).await?;
    info!(campaign_id = %campaign.id, "Campaign created");
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<CampaignInput>, Error>,
) -> Result<Json<Campaign>> {
    let campaign = db::get_campaign(&state.db, &id).await?.update(input)?;
    let campaign = db::update_campaign(&state.db, &campaign).await?;
    info!(campaign_id = %campaign.id, "Campaign updated");
    Ok(Json(campaign))
}

async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_campaign(&state.db, &id).await?;
    info!(campaign_id = %id, "Campaign deleted");
    Ok(deleted("Campaign"))
}
