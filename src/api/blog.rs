//! Blog Routes
//!
//! Routes:
//! - GET /blog - List posts (optional `published` filter)
//! - POST /blog - Create a post (auth)
//! - GET /blog/:key - Show a post by id or slug
//! - PUT /blog/:key - Update a post (auth)
//! - DELETE /blog/:key - Delete a post (auth)
//!
//! Anonymous readers only ever see published posts. Signed-in callers see
//! drafts too.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use tracing::info;

use super::{deleted, identified, protected};
use crate::{
    db::{self, BlogPost, BlogPostFilter, BlogPostInput},
    error::{Error, Result},
    middleware::AuthUser,
    AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/blog",
            identified(state, get(list_posts)).merge(protected(state, post(create_post))),
        )
        .route(
            "/blog/:key",
            identified(state, get(show_post)).merge(protected(
                state,
                put(update_post).patch(update_post).delete(delete_post),
            )),
        )
}

async fn list_posts(
    State(state): State<AppState>,
    caller: Option<Extension<AuthUser>>,
    WithRejection(Query(mut filter), _): WithRejection<Query<BlogPostFilter>, Error>,
) -> Result<Json<Vec<BlogPost>>> {
    if caller.is_none() {
        filter.published = Some(true);
    }
    Ok(Json(db::list_blog_posts(&state.db, &filter).await?))
}

async fn show_post(
    State(state): State<AppState>,
    caller: Option<Extension<AuthUser>>,
    Path(key): Path<String>,
) -> Result<Json<BlogPost>> {
    let post = db::get_blog_post(&state.db, &key).await?;
    if caller.is_none() && !post.is_published {
        return Err(Error::NotFound(format!("Blog post {}", key)));
    }
    Ok(Json(post))
}

async fn create_post(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<BlogPostInput>, Error>,
) -> Result<(StatusCode, Json<BlogPost>)> {
    let mut post = BlogPost::create(input)?;
    let explicit = !post.slug.is_empty();
    db::assign_slug(&state.db, &mut post, explicit).await?;

    let post = db::insert_blog_post(&state.db, &post).await?;
    info!(post_id = %post.id, slug = %post.slug, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    Path(key): Path<String>,
    WithRejection(Json(input), _): WithRejection<Json<BlogPostInput>, Error>,
) -> Result<Json<BlogPost>> {
    let slug_sent = input.slug.is_some();
    let mut post = db::get_blog_post(&state.db, &key).await?.update(input)?;

    // A cleared slug is derived again from the title
    if slug_sent || post.slug.is_empty() {
        let explicit = !post.slug.is_empty();
        db::assign_slug(&state.db, &mut post, explicit).await?;
    }

    let post = db::update_blog_post(&state.db, &post).await?;
    info!(post_id = %post.id, "Blog post updated");
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    let post = db::get_blog_post(&state.db, &key).await?;
    db::delete_blog_post(&state.db, &post.id).await?;
    info!(post_id = %post.id, "Blog post deleted");
    Ok(deleted("Blog post"))
}
