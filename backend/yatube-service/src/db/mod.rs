/// Database access layer
///
/// `Store` is the seam between the blog rules and persistence. Two
/// implementations exist:
/// - `PgStore`: PostgreSQL through sqlx (production)
/// - `MemoryStore`: process-local tables (development and tests)
pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use postgres::PgStore;

use crate::error::Result;
use crate::models::{
    Comment, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges, PostFilter, User,
};

/// Persistence operations used by the services.
///
/// Listings are ordered newest first (`pub_date DESC, id DESC`); comments
/// oldest first.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    // Groups
    async fn create_group(&self, group: NewGroup) -> Result<Group>;
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;
    async fn list_groups(&self) -> Result<Vec<Group>>;

    // Posts
    async fn create_post(&self, post: NewPost) -> Result<Post>;
    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;
    /// Returns `None` if the post does not exist.
    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>>;
    /// Returns true if a post was removed. Its comments go with it.
    async fn delete_post(&self, post_id: i64) -> Result<bool>;
    async fn list_posts(&self, filter: PostFilter, limit: i64, offset: i64) -> Result<Vec<Post>>;
    async fn count_posts(&self, filter: PostFilter) -> Result<i64>;

    // Comments
    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    // Follows
    /// Idempotent; returns true if a new follow was recorded.
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;
    /// Idempotent; returns true if a follow was removed.
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;
    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;
    /// Authors `user_id` follows, by username.
    async fn list_following(&self, user_id: i64) -> Result<Vec<User>>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
