//! Post endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use quill_common::AppResult;
use quill_core::{CreatePostInput, UpdatePostInput};
use quill_db::entities::{post, sub_post};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{comments, favorites},
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

const fn default_limit() -> u64 {
    10
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub views_count: i32,
    pub like_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            body: p.body,
            image_url: p.image_url,
            views_count: p.views_count,
            like_count: p.like_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Sub-post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPostResponse {
    pub id: String,
    pub post_id: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<sub_post::Model> for SubPostResponse {
    fn from(s: sub_post::Model) -> Self {
        Self {
            id: s.id,
            post_id: s.post_id,
            title: s.title,
            body: s.body,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// Post response with its sub-posts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub sub_posts: Vec<SubPostResponse>,
    /// Whether the caller has liked this post. Absent for anonymous callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

impl PostDetailResponse {
    fn new(post: post::Model, sub_posts: Vec<sub_post::Model>, liked: Option<bool>) -> Self {
        Self {
            post: post.into(),
            sub_posts: sub_posts.into_iter().map(Into::into).collect(),
            liked,
        }
    }
}

/// List posts query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Get recent posts.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = query.limit.min(100);
    let posts = state
        .post_service
        .list(limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Create post request: a single post or a batch of posts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreatePostRequest {
    Bulk(Vec<CreatePostInput>),
    Single(CreatePostInput),
}

/// Create one post, or several at once when the body is a list.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<Response> {
    match req {
        CreatePostRequest::Single(input) => {
            let (post, sub_posts) = state.post_service.create(&user.id, input).await?;
            Ok(ApiResponse::with_status(
                StatusCode::CREATED,
                PostDetailResponse::new(post, sub_posts, None),
            ))
        }
        CreatePostRequest::Bulk(inputs) => {
            let posts = state.post_service.create_many(&user.id, inputs).await?;
            let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();
            Ok(ApiResponse::with_status(StatusCode::CREATED, body))
        }
    }
}

/// Get a post with its sub-posts.
///
/// Authenticated callers additionally get whether they have liked it.
async fn get_post(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let (post, sub_posts) = state.post_service.get(&id).await?;

    let liked = match user {
        Some(user) => Some(state.post_service.has_liked(&user.id, &id).await?),
        None => None,
    };

    Ok(ApiResponse::ok(PostDetailResponse::new(post, sub_posts, liked)))
}

/// Update a post. Only its author may update it.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let (post, sub_posts) = state.post_service.update(&user.id, &id, req).await?;
    Ok(ApiResponse::ok(PostDetailResponse::new(post, sub_posts, None)))
}

/// Delete a post. Only its author may delete it.
async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&user.id, &id).await?;
    Ok(response::ok())
}

/// Like toggle response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub status: &'static str,
    pub like_count: u64,
}

/// Toggle a like on a post.
///
/// Responds 201 when the like was added and 200 when it was removed.
async fn toggle_like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.post_service.toggle_like(&user.id, &id).await?;

    if outcome.liked {
        if let Err(e) = state
            .notification_service
            .notify_post_liked(&user.id, &outcome.post_author_id, &id)
            .await
        {
            tracing::warn!(error = %e, post_id = %id, "Failed to create like notification");
        }
    }

    let status = if outcome.liked {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok(ApiResponse::with_status(
        status,
        LikeResponse {
            status: if outcome.liked { "liked" } else { "unliked" },
            like_count: outcome.like_count,
        },
    ))
}

/// View count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCountResponse {
    pub views_count: i32,
}

/// Record a view on a post and return the refreshed counter.
async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ViewCountResponse>> {
    let post = state.post_service.view(&id).await?;
    Ok(ApiResponse::ok(ViewCountResponse {
        views_count: post.views_count,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{id}",
            get(get_post)
                .put(update)
                .patch(update)
                .delete(delete_post),
        )
        .route("/{id}/like", post(toggle_like))
        .route("/{id}/view", get(view))
        .route(
            "/{id}/comments",
            get(comments::list_for_post).post(comments::create_for_post),
        )
        .route(
            "/{id}/favorite",
            post(favorites::create_for_post).delete(favorites::delete_for_post),
        )
}
