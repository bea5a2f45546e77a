//! Favorite endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use quill_common::AppResult;
use quill_db::entities::favorite;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

const fn default_limit() -> u64 {
    50
}

/// Favorite response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: String,
}

impl From<favorite::Model> for FavoriteResponse {
    fn from(f: favorite::Model) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            post_id: f.post_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Favorite a post.
pub async fn create_for_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let favorite = state.favorite_service.create(&user.id, &post_id).await?;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        FavoriteResponse::from(favorite),
    ))
}

/// Remove a favorite from a post.
pub async fn delete_for_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.favorite_service.delete(&user.id, &post_id).await?;
    Ok(response::ok())
}

/// List favorites query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFavoritesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Get the caller's favorites, newest first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListFavoritesQuery>,
) -> AppResult<ApiResponse<Vec<FavoriteResponse>>> {
    let limit = query.limit.min(100);
    let favorites = state
        .favorite_service
        .list(&user.id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        favorites.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
