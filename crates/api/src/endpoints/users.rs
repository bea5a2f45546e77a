//! User endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use quill_common::AppResult;
use serde::Deserialize;

use crate::{
    endpoints::posts::PostResponse,
    middleware::AppState,
    response::ApiResponse,
};

const fn default_limit() -> u64 {
    10
}

/// List user posts query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserPostsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Get posts by an author, newest first.
async fn list_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListUserPostsQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    // User must exist
    state.user_service.get(&id).await?;

    let limit = query.limit.min(100);
    let posts = state
        .post_service
        .list_by_user(&id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/posts", get(list_posts))
}
