mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostRecord};
pub use user::{Identity, User};
