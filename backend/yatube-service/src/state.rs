//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::cache::PageCache;
use crate::config::Config;
use crate::db::Store;
use crate::media::MediaStorage;
use crate::security::SessionKeys;
use crate::services::{AccountService, CommentService, FollowService, PostService};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub page_cache: Arc<dyn PageCache>,
    pub media: MediaStorage,
    pub sessions: Arc<SessionKeys>,
    pub posts: PostService,
    pub comments: CommentService,
    pub follows: FollowService,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, page_cache: Arc<dyn PageCache>) -> Self {
        let media = MediaStorage::new(config.media.root.clone());
        let sessions = Arc::new(SessionKeys::new(&config.session));
        let per_page = config.posts_per_page;

        Self {
            posts: PostService::new(store.clone(), media.clone(), per_page),
            comments: CommentService::new(store.clone()),
            follows: FollowService::new(store.clone(), per_page),
            accounts: AccountService::new(store.clone()),
            config,
            store,
            page_cache,
            media,
            sessions,
        }
    }
}
