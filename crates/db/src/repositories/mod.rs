//! Database repositories.
//!
//! Each repository wraps a [`sea_orm::DatabaseConnection`] and exposes the
//! queries its domain needs. Multi-step writes that must stay consistent
//! (like toggling, view counting, sub-post reconciliation) run inside a
//! single transaction.

pub mod comment;
pub mod favorite;
pub mod like;
pub mod notification;
pub mod post;
pub mod sub_post;
pub mod user;

pub use comment::CommentRepository;
pub use favorite::FavoriteRepository;
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use sub_post::{SubPostChange, SubPostRepository};
pub use user::UserRepository;
