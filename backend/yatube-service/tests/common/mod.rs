#![allow(dead_code)]
//! Shared fixtures for HTTP tests: an app state over the in-memory store
//! and page cache, with media written to a temporary directory.

use actix_web::{body::MessageBody, cookie::Cookie, dev::ServiceResponse, http::header, test, web};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use yatube_service::cache::{MemoryPageCache, PageCache};
use yatube_service::config::Config;
use yatube_service::db::{MemoryStore, Store};
use yatube_service::models::{Group, NewGroup, NewPost, NewUser, Post, PostFilter, User};
use yatube_service::security::hash_password;
use yatube_service::AppState;

pub const PASSWORD: &str = "Sup3r-secret";

/// A 2x1 GIF.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

const BOUNDARY: &str = "----yatube-test-boundary";

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub store: Arc<dyn Store>,
    pub cache: Arc<MemoryPageCache>,
    pub media: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("temp media dir");
        let mut config = Config::default();
        config.media.root = media.path().to_path_buf();

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryPageCache::new(
            Duration::from_secs(config.cache.index_ttl_secs),
            config.cache.max_entries,
        ));
        let page_cache: Arc<dyn PageCache> = cache.clone();
        let state = web::Data::new(AppState::new(config, store.clone(), page_cache));

        Self {
            state,
            store,
            cache,
            media,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: hash_password(PASSWORD).unwrap(),
            })
            .await
            .unwrap()
    }

    pub async fn group(&self, title: &str, slug: &str) -> Group {
        self.store
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: "Тестовое описание".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .unwrap()
    }

    pub async fn post_count(&self) -> i64 {
        self.store.count_posts(PostFilter::All).await.unwrap()
    }

    /// Session cookie logging `user` in.
    pub fn login(&self, user: &User) -> Cookie<'static> {
        self.state.sessions.login_cookie(user).unwrap()
    }
}

/// `multipart/form-data` body with text fields and an optional file.
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_string<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Number of post cards on a listing page.
pub fn card_count(body: &str) -> usize {
    body.matches("class=\"post-card").count()
}
