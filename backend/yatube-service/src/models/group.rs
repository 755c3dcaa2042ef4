use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    /// Unique, used as the URL key of the group page.
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_title() {
        let group = Group {
            id: 1,
            title: "Заголовок тестовой группы".into(),
            slug: "test-slug".into(),
            description: "Тестовое описание".into(),
        };
        assert_eq!(group.to_string(), "Заголовок тестовой группы");
    }
}
