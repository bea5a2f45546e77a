//! Database entities.

pub mod comment;
pub mod favorite;
pub mod like;
pub mod notification;
pub mod post;
pub mod sub_post;
pub mod user;

pub use comment::Entity as Comment;
pub use favorite::Entity as Favorite;
pub use like::Entity as Like;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use sub_post::Entity as SubPost;
pub use user::Entity as User;
