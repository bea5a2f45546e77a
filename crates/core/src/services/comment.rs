//! Comment service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 8192))]
    pub text: String,

    /// Parent comment ID for threaded replies.
    pub parent_id: Option<String>,
}

/// A created comment plus the users to notify about it.
#[derive(Debug, Clone)]
pub struct CommentCreated {
    pub comment: comment::Model,
    /// Author of the post that was commented on.
    pub post_author_id: String,
    /// Author of the parent comment, when this is a reply.
    pub parent_author_id: Option<String>,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment on a post, optionally as a reply to another comment.
    pub async fn create(
        &self,
        user_id: &str,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<CommentCreated> {
        input.validate()?;

        if input.text.trim().is_empty() {
            return Err(AppError::Validation("text must not be blank".to_string()));
        }

        let post = self.post_repo.get_by_id(post_id).await?;

        let parent = match &input.parent_id {
            Some(parent_id) => {
                let parent = self.comment_repo.get_by_id(parent_id).await?;
                if parent.post_id != post_id {
                    return Err(AppError::Validation(
                        "parent comment belongs to a different post".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(user_id.to_string()),
            text: Set(input.text),
            parent_id: Set(input.parent_id),
            like_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment created");

        Ok(CommentCreated {
            comment,
            post_author_id: post.user_id,
            parent_author_id: parent.map(|p| p.user_id),
        })
    }

    /// Get comments on a post.
    pub async fn list(
        &self,
        post_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        // Post must exist
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, since_id).await
    }

    /// Delete a comment. Only its author may delete it.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, user_id = %user_id, "Comment deleted");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_db::entities::post;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "title".to_string(),
            body: "body".to_string(),
            image_url: None,
            views_count: 0,
            like_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, post_id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            text: "a comment".to_string(),
            parent_id: None,
            like_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
        );

        let result = service
            .create(
                "u1",
                "p1",
                CreateCommentInput {
                    text: "   ".to_string(),
                    parent_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_post() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
        );

        let result = service
            .create(
                "u1",
                "missing",
                CreateCommentInput {
                    text: "hello".to_string(),
                    parent_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_cross_post_parent() {
        let post = create_test_post("p1", "author");
        let parent = create_test_comment("c1", "other-post", "u2");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[parent]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
        );

        let result = service
            .create(
                "u1",
                "p1",
                CreateCommentInput {
                    text: "reply".to_string(),
                    parent_id: Some("c1".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_reply_returns_parent() {
        let post = create_test_post("p1", "author");
        let parent = create_test_comment("c1", "p1", "u2");
        let created = comment::Model {
            parent_id: Some("c1".to_string()),
            ..create_test_comment("c2", "p1", "u1")
        };

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![parent], vec![created]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
        );

        let created = service
            .create(
                "u1",
                "p1",
                CreateCommentInput {
                    text: "reply".to_string(),
                    parent_id: Some("c1".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.comment.parent_id.as_deref(), Some("c1"));
        assert_eq!(created.post_author_id, "author");
        assert_eq!(created.parent_author_id.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_delete_rejects_non_owner() {
        let comment = create_test_comment("c1", "p1", "owner");

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
        );

        let result = service.delete("intruder", "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
