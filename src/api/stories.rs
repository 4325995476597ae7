//! Story Routes
//!
//! Beneficiary stories.
//!
//! Routes:
//! - GET /stories - List stories (optional `featured` filter)
//! - POST /stories - Create a story (auth)
//! - GET /stories/:id - Show a story
//! - PUT /stories/:id - Update a story (auth)
//! - DELETE /stories/:id - Delete a story (auth)

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
    db::{self, Story, StoryFilter, StoryInput},
    error::{Error, Result},
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/stories",
            get(list_stories).merge(protected(state, post(create_story))),
        )
        .route(
            "/stories/:id",
            get(show_story).merge(protected(
                state,
                put(update_story)
                    .patch(update_story)
                    .delete(delete_story),
            )),
        )
}

async fn list_stories(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<StoryFilter>, Error>,
) -> Result<Json<Vec<Story>>> {
    Ok(Json(db::list_stories(&state.db, &filter).await?))
}

async fn show_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Story>> {
    Ok(Json(db::get_story(&state.db, &id).await?))
}

async fn create_story(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<StoryInput>, Error>,
) -> Result<(StatusCode, Json<Story>)> {
    let story = db::insert_story(&state.db, &Story::create(input)?).await?;
    info!(story_id = %story.id, "Story created");
    Ok((StatusCode::CREATED, Json(story)))
}

async fn update_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<StoryInput>, Error>,
) -> Result<Json<Story>> {
    let story = db::get_story(&state.db, &id).await?.update(input)?;
    let story = db::update_story(&state.db, &story).await?;
    info!(story_id = %story.id, "Story updated");
    Ok(Json(story))
}

async fn delete_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_story(&state.db, &id).await?;
    info!(story_id = %id, "Story deleted");
    Ok(deleted("Story"))
}
