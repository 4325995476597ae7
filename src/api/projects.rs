//! Project Routes
//!
//! Field projects and their impact figures.
//!
//! Routes:
//! - GET /projects - List projects (optional `status` filter)
//! - POST /projects - Create a project (auth)
//! - GET /projects/:id - Show a project
//! - PUT /projects/:id - Update a project (auth)
//! - DELETE /projects/:id - Delete a project (auth)

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
    db::{self, Project, ProjectFilter, ProjectInput},
    error::{Error, Result},
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(list_projects).merge(protected(state, post(create_project))),
        )
        .route(
            "/projects/:id",
            get(show_project).merge(protected(
                state,
                put(update_project)
                    .patch(update_project)
                    .delete(delete_project),
            )),
        )
}

async fn list_projects(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<ProjectFilter>, Error>,
) -> Result<Json<Vec<Project>>> {
    Ok(Json(db::list_projects(&state.db, &filter).await?))
}

async fn show_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(db::get_project(&state.db, &id).await?))
}

async fn create_project(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<ProjectInput>, Error>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = db::insert_project(&state.db, &Project::create(input)?).await?;
    info!(project_id = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<ProjectInput>, Error>,
) -> Result<Json<Project>> {
    let project = db::get_project(&state.db, &id).await?.update(input)?;
    let project = db::update_project(&state.db, &project).await?;
    info!(project_id = %project.id, "Project updated");
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_project(&state.db, &id).await?;
    info!(project_id = %id, "Project deleted");
    Ok(deleted("Project"))
}
