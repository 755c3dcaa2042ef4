/// HTTP handlers
///
/// Handlers extract the request, call a service and render a template.
/// View structs here shape models for templates (URLs and dates are
/// resolved in Rust so templates stay dumb).
pub mod about;
pub mod auth;
pub mod comments;
pub mod fallback;
pub mod follow;
pub mod health;
pub mod media;
pub mod posts;

use actix_web::{http::header, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Comment, Post, User};
use crate::pagination::Page;
use crate::urls;

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// "18 октября 2026"
pub fn format_date(date: &DateTime<Utc>) -> String {
    use chrono::Datelike;
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// A post as listing and detail templates show it.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub author_url: String,
    pub pub_date: String,
    pub detail_url: String,
    pub edit_url: String,
    pub image_url: Option<String>,
    pub group_title: Option<String>,
    pub group_url: Option<String>,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            author: post.author_username.clone(),
            author_url: urls::profile(&post.author_username),
            pub_date: format_date(&post.pub_date),
            detail_url: urls::post_detail(post.id),
            edit_url: urls::post_edit(post.id),
            image_url: post.image.as_deref().map(urls::media),
            group_title: post.group_title.clone(),
            group_url: post.group_slug.as_deref().map(urls::group_list),
        }
    }
}

pub fn post_cards(page: Page<Post>) -> Page<PostCard> {
    page.map(|post| PostCard::from(&post))
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub author: String,
    pub author_url: String,
    pub text: String,
    pub created: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment.author_username.clone(),
            author_url: urls::profile(&comment.author_username),
            text: comment.text.clone(),
            created: format_date(&comment.created),
        }
    }
}

/// An author link, as in the follow page's "you follow" list.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorLink {
    pub username: String,
    pub url: String,
}

impl From<&User> for AuthorLink {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            url: urls::profile(&user.username),
        }
    }
}
