//! Comment endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::delete,
    Json, Router,
};
use quill_common::AppResult;
use quill_core::{CommentCreated, CreateCommentInput};
use quill_db::entities::comment;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

const fn default_limit() -> u64 {
    50
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub text: String,
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            text: c.text,
            parent_id: c.parent_id,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// List comments query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub since_id: Option<String>,
}

/// Get comments on a post, oldest first.
pub async fn list_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let limit = query.limit.min(200);
    let comments = state
        .comment_service
        .list(&post_id, limit, query.since_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Create a comment on a post.
pub async fn create_for_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<CreateCommentInput>,
) -> AppResult<Response> {
    let created = state.comment_service.create(&user.id, &post_id, req).await?;

    notify(&state, &user.id, &post_id, &created).await;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        CommentResponse::from(created.comment),
    ))
}

/// Notify the post author, and the parent comment author for replies.
///
/// The two fan-outs are independent; the service suppresses
/// self-notifications on its own.
async fn notify(state: &AppState, sender_id: &str, post_id: &str, created: &CommentCreated) {
    if let Err(e) = state
        .notification_service
        .notify_post_commented(
            sender_id,
            &created.post_author_id,
            post_id,
            &created.comment.id,
        )
        .await
    {
        tracing::warn!(error = %e, post_id = %post_id, "Failed to create comment notification");
    }

    if let (Some(parent_author), Some(parent_id)) =
        (&created.parent_author_id, &created.comment.parent_id)
    {
        if let Err(e) = state
            .notification_service
            .notify_comment_replied(
                sender_id,
                parent_author,
                post_id,
                &created.comment.id,
                parent_id,
            )
            .await
        {
            tracing::warn!(error = %e, parent_id = %parent_id, "Failed to create reply notification");
        }
    }
}

/// Delete a comment. Only its author may delete it.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&user.id, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(remove))
}
