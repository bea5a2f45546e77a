//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use quill_api::{middleware::AppState, router as api_router};
use quill_core::{
    CommentService, FavoriteService, NotificationService, PostService, UserService,
};
use quill_db::entities::{comment, like, notification, post, sub_post, user};
use quill_db::repositories::{
    CommentRepository, FavoriteRepository, LikeRepository, NotificationRepository, PostRepository,
    SubPostRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

/// Create test app state around a mock database connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let sub_post_repo = SubPostRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    AppState {
        user_service: UserService::new(user_repo),
        post_service: PostService::new(post_repo.clone(), sub_post_repo, like_repo),
        comment_service: CommentService::new(comment_repo, post_repo.clone()),
        favorite_service: FavoriteService::new(favorite_repo, post_repo),
        notification_service: NotificationService::new(notification_repo),
    }
}

fn create_test_router(db: DatabaseConnection) -> Router {
    api_router().with_state(create_test_state(db))
}

fn empty_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_posts_returns_ok_when_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_post_requires_auth() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"t","body":"b"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_requires_auth() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1/like")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_view_does_not_require_auth() {
    // Missing post: the handler runs without auth and reports not found
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1/view")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorites_require_auth() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/favorites")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn create_test_user(id: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: "alice".to_string(),
        username_lower: "alice".to_string(),
        password_hash: None,
        token: Some(token.to_string()),
        name: None,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_post(id: &str, user_id: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: "title".to_string(),
        body: "body".to_string(),
        image_url: None,
        views_count: 0,
        like_count: 0,
        created_at: chrono::Utc::now().into(),
        updated_at: chrono::Utc::now().into(),
    }
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_post_reports_liked_state_for_caller() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("u1", "t1")]])
        .append_query_results([[create_test_post("p1", "author")]])
        .append_query_results([Vec::<sub_post::Model>::new()])
        .append_query_results([[like::Model {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            post_id: "p1".to_string(),
            created_at: chrono::Utc::now().into(),
        }]])
        .into_connection();
    let state = create_test_state(db);
    let app = Router::new()
        .merge(api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            quill_api::middleware::auth_middleware,
        ))
        .with_state(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1")
                .method("GET")
                .header("Authorization", "Bearer t1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["liked"], serde_json::json!(true));
}

#[tokio::test]
async fn test_get_post_omits_liked_state_for_anonymous() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_post("p1", "author")]])
        .append_query_results([Vec::<sub_post::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"].get("liked").is_none());
}

#[tokio::test]
async fn test_reply_comment_is_created_with_both_notifications() {
    let parent = comment::Model {
        id: "c1".to_string(),
        post_id: "p1".to_string(),
        user_id: "u2".to_string(),
        text: "first".to_string(),
        parent_id: None,
        like_count: 0,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    };
    let reply = comment::Model {
        id: "c2".to_string(),
        parent_id: Some("c1".to_string()),
        user_id: "u1".to_string(),
        text: "reply".to_string(),
        ..parent.clone()
    };
    let notification_for = |id: &str, recipient: &str| notification::Model {
        id: id.to_string(),
        recipient_id: recipient.to_string(),
        sender_id: "u1".to_string(),
        notification_type: notification::NotificationType::CommentPost,
        post_id: Some("p1".to_string()),
        comment_id: Some("c2".to_string()),
        parent_comment_id: None,
        is_read: false,
        created_at: chrono::Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("u1", "t1")]])
        .append_query_results([[create_test_post("p1", "author")]])
        .append_query_results([vec![parent], vec![reply]])
        .append_query_results([
            vec![notification_for("n1", "author")],
            vec![notification_for("n2", "u2")],
        ])
        .into_connection();
    let state = create_test_state(db);
    let app = Router::new()
        .merge(api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            quill_api::middleware::auth_middleware,
        ))
        .with_state(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1/comments")
                .method("POST")
                .header("Authorization", "Bearer t1")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"text":"reply","parent_id":"c1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["parentId"], serde_json::json!("c1"));
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router(empty_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/signup")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
