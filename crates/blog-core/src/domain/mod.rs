//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use location::Location;
pub use post::Post;
pub use user::User;

use uuid::Uuid;

/// Maximum length of titles and names, in characters.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Entities carrying a publication toggle.
pub trait Publishable {
    fn is_published(&self) -> bool;
}

/// Entities owned by a single user.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}
