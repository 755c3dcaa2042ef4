use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, PostFilter,
    User,
};

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    follows: Vec<Follow>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn group(&self, group_id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    fn hydrate(&self, row: &PostRow) -> Post {
        let group = row.group_id.and_then(|id| self.group(id));
        Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author_id: row.author_id,
            author_username: self
                .user(row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group_id: group.map(|g| g.id),
            group_slug: group.map(|g| g.slug.clone()),
            group_title: group.map(|g| g.title.clone()),
            image: row.image.clone(),
        }
    }

    fn matches(&self, row: &PostRow, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => row.group_id == Some(group_id),
            PostFilter::Author(author_id) => row.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == row.author_id),
        }
    }
}

/// Process-local `Store`. Same contract as `PgStore`, including unique
/// usernames, unique group slugs and one follow per pair.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }

        let created = User {
            id: t.next_id(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.user(user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut t = self.tables.write().await;
        if t.groups.iter().any(|g| g.slug == group.slug) {
            return Err(AppError::Conflict(format!(
                "group slug {} already taken",
                group.slug
            )));
        }

        let created = Group {
            id: t.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        t.groups.push(created.clone());
        Ok(created)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = self.tables.read().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let mut t = self.tables.write().await;
        if t.user(post.author_id).is_none() {
            return Err(AppError::Database(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if t.group(group_id).is_none() {
                return Err(AppError::Database(format!("group {} does not exist", group_id)));
            }
        }

        let row = PostRow {
            id: t.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        let created = t.hydrate(&row);
        t.posts.push(row);
        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().find(|p| p.id == post_id).map(|row| t.hydrate(row)))
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let mut t = self.tables.write().await;
        let Some(index) = t.posts.iter().position(|p| p.id == post_id) else {
            return Ok(None);
        };

        let row = &mut t.posts[index];
        row.text = changes.text;
        row.group_id = changes.group_id;
        if let Some(image) = changes.image {
            row.image = Some(image);
        }

        let row = t.posts[index].clone();
        Ok(Some(t.hydrate(&row)))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.posts.len();
        t.posts.retain(|p| p.id != post_id);
        let removed = t.posts.len() != before;
        if removed {
            t.comments.retain(|c| c.post_id != post_id);
        }
        Ok(removed)
    }

    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&PostRow> = t.posts.iter().filter(|p| t.matches(p, filter)).collect();
        rows.sort_by_key(|p| Reverse((p.pub_date, p.id)));

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|row| t.hydrate(row))
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.posts.iter().filter(|p| t.matches(p, filter)).count() as i64)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut t = self.tables.write().await;
        if !t.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(AppError::Database(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        let author_username = t
            .user(comment.author_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| {
                AppError::Database(format!("author {} does not exist", comment.author_id))
            })?;

        let row = CommentRow {
            id: t.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        let created = Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username,
            text: row.text.clone(),
            created: row.created,
        };
        t.comments.push(row);
        Ok(created)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut comments: Vec<Comment> = t
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| Comment {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                author_username: t
                    .user(c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                text: c.text.clone(),
                created: c.created,
            })
            .collect();
        comments.sort_by_key(|c| (c.created, c.id));
        Ok(comments)
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if user_id == author_id {
            return Err(AppError::Database("users cannot follow themselves".into()));
        }
        if t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let id = t.next_id();
        t.follows.push(Follow {
            id,
            user_id,
            author_id,
        });
        Ok(true)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.follows.len();
        t.follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(t.follows.len() != before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let t = self.tables.read().await;
        Ok(t
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn list_following(&self, user_id: i64) -> Result<Vec<User>> {
        let t = self.tables.read().await;
        let mut authors: Vec<User> = t
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| t.user(f.author_id).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }
}
