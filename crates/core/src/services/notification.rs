//! Notification service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
///
/// Notifications are never sent to the user who triggered them.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Notify a post author that their post was liked.
    pub async fn notify_post_liked(
        &self,
        sender_id: &str,
        recipient_id: &str,
        post_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.notify(
            sender_id,
            recipient_id,
            NotificationType::LikePost,
            Some(post_id),
            None,
            None,
        )
        .await
    }

    /// Notify a post author that someone commented on their post.
    pub async fn notify_post_commented(
        &self,
        sender_id: &str,
        recipient_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.notify(
            sender_id,
            recipient_id,
            NotificationType::CommentPost,
            Some(post_id),
            Some(comment_id),
            None,
        )
        .await
    }

    /// Notify a comment author that someone replied to their comment.
    pub async fn notify_comment_replied(
        &self,
        sender_id: &str,
        recipient_id: &str,
        post_id: &str,
        comment_id: &str,
        parent_comment_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        self.notify(
            sender_id,
            recipient_id,
            NotificationType::ReplyComment,
            Some(post_id),
            Some(comment_id),
            Some(parent_comment_id),
        )
        .await
    }

    async fn notify(
        &self,
        sender_id: &str,
        recipient_id: &str,
        notification_type: NotificationType,
        post_id: Option<&str>,
        comment_id: Option<&str>,
        parent_comment_id: Option<&str>,
    ) -> AppResult<Option<notification::Model>> {
        // No self-notifications
        if sender_id == recipient_id {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            notification_type: Set(notification_type),
            post_id: Set(post_id.map(ToString::to_string)),
            comment_id: Set(comment_id.map(ToString::to_string)),
            parent_comment_id: Set(parent_comment_id.map(ToString::to_string)),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        let created = self.notification_repo.create(model).await?;
        Ok(Some(created))
    }

    /// Get the caller's notifications.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await
    }

    /// Mark one of the caller's notifications as read.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        // Hide other users' notifications rather than revealing they exist
        if notification.recipient_id != user_id {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark all of the caller's notifications as read.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count the caller's unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}
