//! Favorite service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::favorite,
    repositories::{FavoriteRepository, PostRepository},
};
use sea_orm::Set;

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub fn new(favorite_repo: FavoriteRepository, post_repo: PostRepository) -> Self {
        Self {
            favorite_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Favorite a post.
    pub async fn create(&self, user_id: &str, post_id: &str) -> AppResult<favorite::Model> {
        // Post must exist
        self.post_repo.get_by_id(post_id).await?;

        if self
            .favorite_repo
            .find_by_user_and_post(user_id, post_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Already favorited".to_string()));
        }

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.favorite_repo.create(model).await
    }

    /// Remove a favorite.
    pub async fn delete(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.favorite_repo
            .find_by_user_and_post(user_id, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Favorite not found".to_string()))?;

        self.favorite_repo
            .delete_by_user_and_post(user_id, post_id)
            .await
    }

    /// Get a user's favorites.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<favorite::Model>> {
        self.favorite_repo.find_by_user(user_id, limit, until_id).await
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

    fn create_test_favorite(id: &str, user_id: &str, post_id: &str) -> favorite::Model {
        favorite::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let post = create_test_post("p1", "author");
        let existing = create_test_favorite("f1", "u1", "p1");

        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            PostRepository::new(post_db),
        );

        let result = service.create("u1", "p1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_post() {
        let favorite_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            PostRepository::new(post_db),
        );

        let result = service.create("u1", "missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_favorite() {
        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<favorite::Model>::new()])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            PostRepository::new(post_db),
        );

        let result = service.delete("u1", "p1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list() {
        let f1 = create_test_favorite("f2", "u1", "p2");
        let f2 = create_test_favorite("f1", "u1", "p1");

        let favorite_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[f1, f2]])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = FavoriteService::new(
            FavoriteRepository::new(favorite_db),
            PostRepository::new(post_db),
        );

        let result = service.list("u1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
