//! Resource services. Each one enforces scoping and invariants for its
//! resource before touching the store. The caller's identity is always an
//! explicit argument.

mod comments;
mod follows;
mod groups;
mod posts;

pub use comments::CommentService;
pub use follows::FollowService;
pub use groups::{GroupService, SeedError, seed_groups_from_file};
pub use posts::PostService;

pub(crate) const REQUIRED: &str = "This field is required.";
