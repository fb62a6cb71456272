//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod comment;
pub mod group;
pub mod pagination;
pub mod post;
pub mod user;
pub mod validation;

pub use comment::CommentText;
pub use group::{GroupSlug, GroupTitle};
pub use pagination::{PageParams, Paginated, Pagination, DEFAULT_PER_PAGE};
pub use post::{preview, PostText, PREVIEW_LEN};
pub use user::{validate_email, validate_name, NewPassword, Username};
pub use validation::ValidationError;
