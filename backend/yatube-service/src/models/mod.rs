/// Data models for yatube
///
/// - User: registered account (authors and readers)
/// - Post: authored text, optionally grouped and illustrated
/// - Group: topical collection of posts, addressed by slug
/// - Comment: reader reply attached to a post
/// - Follow: directed subscription from a user to an author
pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, NewComment};
pub use follow::Follow;
pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostChanges, PostFilter};
pub use user::{NewUser, User};

use serde::Serialize;

/// Human-facing description of a model field, shown next to form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub help_text: &'static str,
}

impl FieldMeta {
    pub const fn new(
        name: &'static str,
        verbose_name: &'static str,
        help_text: &'static str,
    ) -> Self {
        Self {
            name,
            verbose_name,
            help_text,
        }
    }
}

pub(crate) fn lookup_field(
    fields: &'static [FieldMeta],
    name: &str,
) -> Option<&'static FieldMeta> {
    fields.iter().find(|f| f.name == name)
}
