use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{lookup_field, FieldMeta};

/// Characters of text kept by the `Display` impl.
pub const TEXT_PREVIEW_CHARS: usize = 15;

/// A published post, joined with its author's username and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// Set once at creation.
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    /// Stored media name, e.g. `posts/small.gif`.
    pub image: Option<String>,
}

static POST_FIELDS: [FieldMeta; 5] = [
    FieldMeta::new("text", "Пост", "Введите текст поста"),
    FieldMeta::new("pub_date", "Дата публикации", ""),
    FieldMeta::new("author", "Автор", ""),
    FieldMeta::new("group", "Группа", "Выберите группу"),
    FieldMeta::new("image", "Картинка", "Загрузите картинку"),
];

impl Post {
    pub fn field(name: &str) -> Option<&'static FieldMeta> {
        lookup_field(&POST_FIELDS, name)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(TEXT_PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields an author may change on an existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    /// `None` keeps the current image.
    pub image: Option<String>,
}

/// Which slice of posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by authors the given user follows.
    FollowedBy(i64),
}
