//! Sub-post repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{SubPost, sub_post};
use chrono::Utc;
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

/// A single item in a sub-post reconciliation change set.
#[derive(Debug, Clone)]
pub enum SubPostChange {
    /// Update an existing sub-post in place. Absent fields keep their value.
    Update {
        id: String,
        title: Option<String>,
        body: Option<String>,
    },
    /// Create a new sub-post under the parent post.
    Create {
        id: String,
        title: String,
        body: String,
    },
}

/// Sub-post repository for database operations.
#[derive(Clone)]
pub struct SubPostRepository {
    db: Arc<DatabaseConnection>,
}

impl SubPostRepository {
    /// Create a new sub-post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get all sub-posts of a post, oldest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<sub_post::Model>> {
        SubPost::find()
            .filter(sub_post::Column::PostId.eq(post_id))
            .order_by_asc(sub_post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Apply a reconciliation change set to a post's sub-posts on `conn`.
///
/// Updates named rows, inserts creates, and deletes every existing sub-post
/// the change set does not mention. Updates referencing an unknown id are
/// skipped. Callers run this on a transaction so a partially applied change
/// set never becomes visible. Returns the final listing.
pub(crate) async fn apply_changes<C: ConnectionTrait>(
    conn: &C,
    post_id: &str,
    changes: Vec<SubPostChange>,
) -> AppResult<Vec<sub_post::Model>> {
    let existing_ids: HashSet<String> = SubPost::find()
        .filter(sub_post::Column::PostId.eq(post_id))
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let now = Utc::now();
    let mut kept: HashSet<String> = HashSet::new();

    for change in changes {
        match change {
            SubPostChange::Update { id, title, body } => {
                if !existing_ids.contains(&id) {
                    continue;
                }
                kept.insert(id.clone());

                let mut active = sub_post::ActiveModel {
                    id: Set(id),
                    ..Default::default()
                };
                if let Some(title) = title {
                    active.title = Set(title);
                }
                if let Some(body) = body {
                    active.body = Set(body);
                }
                active.updated_at = Set(now.into());
                active
                    .update(conn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            SubPostChange::Create { id, title, body } => {
                sub_post::ActiveModel {
                    id: Set(id),
                    post_id: Set(post_id.to_string()),
                    title: Set(title),
                    body: Set(body),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(conn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }
    }

    let to_delete: Vec<String> = existing_ids.difference(&kept).cloned().collect();
    if !to_delete.is_empty() {
        SubPost::delete_many()
            .filter(sub_post::Column::Id.is_in(to_delete))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    SubPost::find()
        .filter(sub_post::Column::PostId.eq(post_id))
        .order_by_asc(sub_post::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

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
    async fn test_find_by_post() {
        let s1 = create_test_sub_post("s1", "p1", "chapter one");
        let s2 = create_test_sub_post("s2", "p1", "chapter two");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = SubPostRepository::new(db);
        let result = repo.find_by_post("p1").await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_apply_changes_skips_unknown_update_id() {
        let s1 = create_test_sub_post("s1", "p1", "only");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // existing rows, final listing (unknown id updates nothing,
            // s1 is kept out of the change set so it gets deleted)
            .append_query_results([vec![s1.clone()], Vec::<sub_post::Model>::new()])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = apply_changes(
            &db,
            "p1",
            vec![SubPostChange::Update {
                id: "ghost".to_string(),
                title: Some("nope".to_string()),
                body: None,
            }],
        )
        .await
        .unwrap();

        assert!(result.is_empty());
    }
}
