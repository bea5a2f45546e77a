//! Business logic services.
//!
//! Services compose repositories and enforce the application's rules:
//! ownership checks, validation, and notification fan-out.

pub mod comment;
pub mod favorite;
pub mod notification;
pub mod post;
pub mod user;

pub use comment::{CommentCreated, CommentService, CreateCommentInput};
pub use favorite::FavoriteService;
pub use notification::NotificationService;
pub use post::{
    CreatePostInput, LikeOutcome, PostService, SubPostInput, SubPostPatch, UpdatePostInput,
};
pub use user::{CreateUserInput, SigninInput, UserService};
