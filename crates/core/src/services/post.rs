//! Post service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{post, sub_post},
    repositories::{LikeRepository, PostRepository, SubPostChange, SubPostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    sub_post_repo: SubPostRepository,
    like_repo: LikeRepository,
    id_gen: IdGenerator,
}

/// A sub-post payload within a post creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct SubPostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub body: String,
}

/// Input for creating a post.
///
/// `title` and `body` are optional at the type level so bulk creation can
/// detect and skip malformed items. Single creation rejects them as a
/// validation error instead.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,

    #[validate(length(max = 512))]
    pub image_url: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub sub_posts: Vec<SubPostInput>,
}

/// A sub-post item within a post update request.
///
/// Items with an `id` update that sub-post; items without one create a new
/// sub-post. Existing sub-posts absent from the list are deleted.
#[derive(Debug, Deserialize, Validate)]
pub struct SubPostPatch {
    pub id: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,
}

/// Input for updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,

    #[validate(length(max = 512))]
    pub image_url: Option<String>,

    #[validate(nested)]
    pub sub_posts: Option<Vec<SubPostPatch>>,
}

/// Result of toggling a like on a post.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    /// Whether the post is liked after the toggle.
    pub liked: bool,
    /// The post's like count after the toggle.
    pub like_count: u64,
    /// The post author, for notification fan-out.
    pub post_author_id: String,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        sub_post_repo: SubPostRepository,
        like_repo: LikeRepository,
    ) -> Self {
        Self {
            post_repo,
            sub_post_repo,
            like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post with its sub-posts.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreatePostInput,
    ) -> AppResult<(post::Model, Vec<sub_post::Model>)> {
        input.validate()?;

        let Some((title, body)) = Self::required_fields(&input) else {
            return Err(AppError::Validation(
                "title and body are required".to_string(),
            ));
        };

        let models = self.build_post_models(user_id, title, body, &input);
        let created = self.post_repo.create_many_with_sub_posts(vec![models]).await?;
        let post = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Post insert returned no row".to_string()))?;

        let sub_posts = self.sub_post_repo.find_by_post(&post.id).await?;
        tracing::info!(post_id = %post.id, user_id = %user_id, "Post created");

        Ok((post, sub_posts))
    }

    /// Create several posts in one transaction.
    ///
    /// Items missing a title or body are skipped rather than failing the
    /// whole batch. Returns the posts that were created.
    pub async fn create_many(
        &self,
        user_id: &str,
        inputs: Vec<CreatePostInput>,
    ) -> AppResult<Vec<post::Model>> {
        let total = inputs.len();
        let mut batch = Vec::with_capacity(total);

        for input in inputs {
            input.validate()?;
            let Some((title, body)) = Self::required_fields(&input) else {
                continue;
            };
            batch.push(self.build_post_models(user_id, title, body, &input));
        }

        let skipped = total - batch.len();
        if skipped > 0 {
            tracing::debug!(skipped, total, "Skipped malformed items in bulk post creation");
        }

        let created = self.post_repo.create_many_with_sub_posts(batch).await?;
        tracing::info!(count = created.len(), user_id = %user_id, "Posts created in bulk");

        Ok(created)
    }

    /// Get a post with its sub-posts.
    pub async fn get(&self, post_id: &str) -> AppResult<(post::Model, Vec<sub_post::Model>)> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let sub_posts = self.sub_post_repo.find_by_post(post_id).await?;
        Ok((post, sub_posts))
    }

    /// Get recent posts.
    pub async fn list(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_recent(limit, until_id).await
    }

    /// Get posts by an author.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_user(user_id, limit, until_id).await
    }

    /// Update a post, reconciling sub-posts when a list is sent.
    pub async fn update(
        &self,
        user_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<(post::Model, Vec<sub_post::Model>)> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this post".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(body) = input.body {
            active.body = Set(body);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(Utc::now().into());

        let changes = match input.sub_posts {
            Some(items) => Some(self.build_sub_post_changes(items)?),
            None => None,
        };

        // One transaction: a failed reconciliation rolls back the post
        // update as well
        self.post_repo.update_with_sub_posts(active, changes).await
    }

    /// Delete a post.
    pub async fn delete(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id = %post_id, user_id = %user_id, "Post deleted");

        Ok(())
    }

    /// Toggle the caller's like on a post.
    ///
    /// Authors cannot like their own posts.
    pub async fn toggle_like(&self, user_id: &str, post_id: &str) -> AppResult<LikeOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id == user_id {
            return Err(AppError::Forbidden(
                "You cannot like your own post".to_string(),
            ));
        }

        let like_id = self.id_gen.generate();
        let (liked, like_count) = self.like_repo.toggle(&like_id, user_id, post_id).await?;

        Ok(LikeOutcome {
            liked,
            like_count,
            post_author_id: post.user_id,
        })
    }

    /// Record a view on a post and return the updated row.
    pub async fn view(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.increment_views(post_id).await
    }

    /// Check whether a user has liked a post.
    pub async fn has_liked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.like_repo.has_liked(user_id, post_id).await
    }

    fn required_fields(input: &CreatePostInput) -> Option<(String, String)> {
        match (&input.title, &input.body) {
            (Some(title), Some(body)) if !title.is_empty() && !body.is_empty() => {
                Some((title.clone(), body.clone()))
            }
            _ => None,
        }
    }

    fn build_post_models(
        &self,
        user_id: &str,
        title: String,
        body: String,
        input: &CreatePostInput,
    ) -> (post::ActiveModel, Vec<sub_post::ActiveModel>) {
        let now = Utc::now();
        let post_id = self.id_gen.generate();

        let post_model = post::ActiveModel {
            id: Set(post_id.clone()),
            user_id: Set(user_id.to_string()),
            title: Set(title),
            body: Set(body),
            image_url: Set(input.image_url.clone()),
            views_count: Set(0),
            like_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let sub_post_models = input
            .sub_posts
            .iter()
            .map(|s| sub_post::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.clone()),
                title: Set(s.title.clone()),
                body: Set(s.body.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            })
            .collect();

        (post_model, sub_post_models)
    }

    fn build_sub_post_changes(
        &self,
        items: Vec<SubPostPatch>,
    ) -> AppResult<Vec<SubPostChange>> {
        items
            .into_iter()
            .map(|item| match item.id {
                Some(id) => Ok(SubPostChange::Update {
                    id,
                    title: item.title,
                    body: item.body,
                }),
                None => match (item.title, item.body) {
                    (Some(title), Some(body)) => Ok(SubPostChange::Create {
                        id: self.id_gen.generate(),
                        title,
                        body,
                    }),
                    _ => Err(AppError::Validation(
                        "new sub-posts require a title and body".to_string(),
                    )),
                },
            })
            .collect()
    }
}
