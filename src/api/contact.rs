//! Contact Routes
//!
//! Routes:
//! - POST /contact - Submit the public contact form (rate limited)
//! - GET /contact - List messages, newest first (auth, optional `unread` filter)
//! - GET /contact/:id - Show a message (auth)
//! - PUT /contact/:id - Mark a message read or unread (auth)
//! - DELETE /contact/:id - Delete a message (auth)

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{deleted, protected};
use crate::{
    db::{self, ContactFilter, ContactMessage, ContactSubmission},
    error::{Error, Result},
    services::client_key,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub is_read: Option<bool>,
}

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/contact",
            post(submit_message).merge(protected(state, get(list_messages))),
        )
        .route(
            "/contact/:id",
            protected(
                state,
                get(show_message)
                    .put(mark_message)
                    .patch(mark_message)
                    .delete(delete_message),
            ),
        )
}

async fn submit_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Json(input), _): WithRejection<Json<ContactSubmission>, Error>,
) -> Result<(StatusCode, Json<Value>)> {
    let client = client_key(&headers);
    if let Err(e) = state.contact_limiter.check(&client) {
        warn!(client = %client, "Contact form rate limit exceeded");
        return Err(e);
    }

    let message = ContactMessage::from_submission(input)?;
    let message = db::insert_contact_message(&state.db, &message).await?;
    info!(message_id = %message.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Thank you for your message. We will get back to you soon.",
            "id": message.id,
        })),
    ))
}

async fn list_messages(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<ContactFilter>, Error>,
) -> Result<Json<Vec<ContactMessage>>> {
    Ok(Json(db::list_contact_messages(&state.db, &filter).await?))
}

async fn show_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>> {
    Ok(Json(db::get_contact_message(&state.db, &id).await?))
}

async fn mark_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<MarkReadRequest>, Error>,
) -> Result<Json<ContactMessage>> {
    let is_read = body
        .is_read
        .ok_or_else(|| Error::field("is_read", "The is read field is required."))?;
    Ok(Json(
        db::set_contact_message_read(&state.db, &id, is_read).await?,
    ))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    db::delete_contact_message(&state.db, &id).await?;
    info!(message_id = %id, "Contact message deleted");
    Ok(deleted("Message"))
}
