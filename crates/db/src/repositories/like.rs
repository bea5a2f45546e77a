//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, Post, like, post};
use chrono::Utc;
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a post.
    pub async fn has_liked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_post(user_id, post_id)
            .await?
            .is_some())
    }

    /// Toggle a user's like on a post.
    ///
    /// Inserts or removes the like row, recounts likes from the table, and
    /// persists the count onto the post, all in one transaction. The count
    /// is taken from a fresh query rather than adjusted by one, so a
    /// drifted denormalized counter self-corrects on the next toggle.
    ///
    /// Returns whether the post is now liked and the resulting count.
    pub async fn toggle(
        &self,
        like_id: &str,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<(bool, u64)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let liked = match existing {
            Some(like) => {
                like.delete(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                false
            }
            None => {
                like::ActiveModel {
                    id: Set(like_id.to_string()),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(post_id.to_string()),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
                true
            }
        };

        let count = Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Post::update_many()
            .col_expr(
                post::Column::LikeCount,
                i32::try_from(count).unwrap_or(i32::MAX).into(),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((liked, count))
    }
}
