//! Post repository.

use std::sync::Arc;

use super::sub_post::{SubPostChange, apply_changes};
use crate::entities::{Post, SubPost, post, sub_post};
use quill_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, erroring if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create several posts, each with its sub-posts, in one transaction.
    pub async fn create_many_with_sub_posts(
        &self,
        posts: Vec<(post::ActiveModel, Vec<sub_post::ActiveModel>)>,
    ) -> AppResult<Vec<post::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut created = Vec::with_capacity(posts.len());
        for (post_model, sub_posts) in posts {
            let inserted = post_model
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            for sub in sub_posts {
                sub.insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            created.push(inserted);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update a post and reconcile its sub-posts in one transaction.
    ///
    /// When `changes` is present the post row update and the whole
    /// reconciliation commit together, so a failed reconciliation rolls
    /// the post's own changes back too. Returns the updated post with its
    /// final sub-post listing.
    pub async fn update_with_sub_posts(
        &self,
        model: post::ActiveModel,
        changes: Option<Vec<SubPostChange>>,
    ) -> AppResult<(post::Model, Vec<sub_post::Model>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let sub_posts = match changes {
            Some(changes) => apply_changes(&txn, &post.id, changes).await?,
            None => SubPost::find()
                .filter(sub_post::Column::PostId.eq(post.id.as_str()))
                .order_by_asc(sub_post::Column::Id)
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((post, sub_posts))
    }

    /// Delete a post (sub-posts, likes, comments and favorites cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let post = self.find_by_id(id).await?;
        if let Some(p) = post {
            p.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get recent posts (paginated).
    pub async fn find_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().order_by_desc(post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get posts by an author (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment a post's view counter and return the updated row.
    ///
    /// The row is locked for the duration of the transaction so concurrent
    /// increments serialize instead of losing updates.
    pub async fn increment_views(&self, id: &str) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let locked = Post::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if locked.is_none() {
            return Err(AppError::PostNotFound(id.to_string()));
        }

        Post::update_many()
            .col_expr(
                post::Column::ViewsCount,
                Expr::col(post::Column::ViewsCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = Post::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: &str, user_id: &str, title: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            image_url: None,
            views_count: 0,
            like_count: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let post = create_test_post("p1", "u1", "hello");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_id("p1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().title, "hello");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_recent() {
        let p1 = create_test_post("p2", "u1", "second");
        let p2 = create_test_post("p1", "u1", "first");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_recent(10, None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p2");
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let p1 = create_test_post("p1", "u1", "mine");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_user("u1", 10, None).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    fn create_test_sub_post(id: &str, post_id: &str, title: &str) -> sub_post::Model {
        sub_post::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_update_with_sub_posts_mixed_change_set() {
        // Existing {s1, s2}; the change set updates s1, creates s3 and
        // leaves s2 unmentioned, so s2 gets deleted.
        let updated_post = create_test_post("p1", "u1", "renamed");
        let s1 = create_test_sub_post("s1", "p1", "old");
        let s2 = create_test_sub_post("s2", "p1", "dropped");
        let mut s1_renamed = s1.clone();
        s1_renamed.title = "X".to_string();
        let s3 = create_test_sub_post("s3", "p1", "new");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated_post]])
                .append_query_results([
                    vec![s1, s2],
                    vec![s1_renamed.clone()],
                    vec![s3.clone()],
                    vec![s1_renamed, s3],
                ])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let mut active: post::ActiveModel = create_test_post("p1", "u1", "old title").into();
        active.title = sea_orm::Set("renamed".to_string());
        active.updated_at = sea_orm::Set(Utc::now().into());

        let repo = PostRepository::new(db);
        let (post, sub_posts) = repo
            .update_with_sub_posts(
                active,
                Some(vec![
                    SubPostChange::Update {
                        id: "s1".to_string(),
                        title: Some("X".to_string()),
                        body: None,
                    },
                    SubPostChange::Create {
                        id: "s3".to_string(),
                        title: "new".to_string(),
                        body: "body".to_string(),
                    },
                ]),
            )
            .await
            .unwrap();

        assert_eq!(post.title, "renamed");
        assert_eq!(sub_posts.len(), 2);
        assert_eq!(sub_posts[0].id, "s1");
        assert_eq!(sub_posts[0].title, "X");
        assert_eq!(sub_posts[1].id, "s3");
        assert!(sub_posts.iter().all(|s| s.id != "s2"));
    }

    #[tokio::test]
    async fn test_update_without_changes_keeps_sub_posts() {
        let updated_post = create_test_post("p1", "u1", "renamed");
        let s1 = create_test_sub_post("s1", "p1", "kept");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated_post]])
                .append_query_results([[s1]])
                .into_connection(),
        );

        let mut active: post::ActiveModel = create_test_post("p1", "u1", "old title").into();
        active.title = sea_orm::Set("renamed".to_string());
        active.updated_at = sea_orm::Set(Utc::now().into());

        let repo = PostRepository::new(db);
        let (post, sub_posts) = repo.update_with_sub_posts(active, None).await.unwrap();

        assert_eq!(post.title, "renamed");
        assert_eq!(sub_posts.len(), 1);
        assert_eq!(sub_posts[0].title, "kept");
    }

    #[tokio::test]
    async fn test_increment_views_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.increment_views("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_increment_views_returns_updated_row() {
        let before = create_test_post("p1", "u1", "hello");
        let mut after = before.clone();
        after.views_count = 1;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![before], vec![after]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.increment_views("p1").await.unwrap();

        assert_eq!(result.views_count, 1);
    }
}
