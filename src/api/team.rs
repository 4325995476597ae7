//! Team Routes
//!
//! Team member profiles for the about page.
//!
//! Routes:
//! - GET /team - List team members
//! - POST /team - Create a team member (auth)
//! - GET /team/:id - Show a team member
//! - PUT /team/:id - Update a team member (auth)
//! - DELETE /team/:id - Delete a team member (auth)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::info;

use super::{deleted, protected};
use crate::{
    db::{self, TeamMember, TeamMemberInput},
    error::{Error, Result},
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/team",
            get(list_team_members).merge(protected(state, post(create_team_member))),
        )
        .route(
            "/team/:id",
            get(show_team_member).merge(protected(
                state,
                put(update_team_member)
                    .patch(update_team_member)
                    .delete(delete_team_member),
            )),
        )
}

async fn list_team_members(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>> {
    Ok(Json(db::list_team_members(&state.db).await?))
}

async fn show_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeamMember>> {
    Ok(Json(db::get_team_member(&state.db, &id).await?))
}

async fn create_team_member(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<TeamMemberInput>, Error>,
) -> Result<(StatusCode, Json<TeamMember>)> {
    let team_member = db::insert_team_member(&state.db, &TeamMember::create(input)?).await?;
    info!(team_member_id = %team_member.id, "Team member created");
    Ok((StatusCode::CREATED, Json(team_member)))
}

async fn update_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<TeamMemberInput>, Error>,
) -> Result<Json<TeamMember>> {
    let team_member = db::get_team_member(&state.db, &id).await?.update(input)?;
    let team_member = db::update_team_member(&state.db, &team_member).await?;
    info!(team_member_id = %team_member.id, "Team member updated");
    Ok(Json(team_member))
}

async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_team_member(&state.db, &id).await?;
    info!(team_member_id = %id, "Team member deleted");
    Ok(deleted("Team member"))
}
