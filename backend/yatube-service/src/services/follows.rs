/// Follow service - subscriptions between users and the follow feed
use std::sync::Arc;

use super::list_page;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::SessionUser;
use crate::models::{Post, PostFilter, User};
use crate::pagination::Page;

pub struct FollowService {
    store: Arc<dyn Store>,
    per_page: usize,
}

impl FollowService {
    pub fn new(store: Arc<dyn Store>, per_page: usize) -> Self {
        Self { store, per_page }
    }

    async fn author(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }

    /// Subscribe `user` to `username`. Following twice or following
    /// yourself changes nothing.
    pub async fn follow(&self, user: &SessionUser, username: &str) -> Result<User> {
        let author = self.author(username).await?;
        if author.id == user.id {
            tracing::debug!(user = %user.username, "ignoring self-follow");
            return Ok(author);
        }

        let created = self.store.create_follow(user.id, author.id).await?;
        if created {
            tracing::info!(follower = %user.username, author = %author.username, "follow created");
        }
        Ok(author)
    }

    pub async fn unfollow(&self, user: &SessionUser, username: &str) -> Result<User> {
        let author = self.author(username).await?;
        if self.store.delete_follow(user.id, author.id).await? {
            tracing::info!(follower = %user.username, author = %author.username, "follow removed");
        }
        Ok(author)
    }

    /// Posts by the authors `user` follows, newest first.
    pub async fn feed(&self, user: &SessionUser, raw_page: Option<&str>) -> Result<Page<Post>> {
        list_page(
            self.store.as_ref(),
            PostFilter::FollowedBy(user.id),
            raw_page,
            self.per_page,
        )
        .await
    }

    pub async fn following(&self, user: &SessionUser) -> Result<Vec<User>> {
        self.store.list_following(user.id).await
    }
}
