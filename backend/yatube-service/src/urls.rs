//! URL builders for named pages, so handlers and templates never spell
//! paths by hand.

pub const INDEX: &str = "/";
pub const POST_CREATE: &str = "/create/";
pub const FOLLOW_INDEX: &str = "/follow/";
pub const LOGIN: &str = "/auth/login/";
pub const SIGNUP: &str = "/auth/signup/";
pub const LOGOUT: &str = "/auth/logout/";
pub const ABOUT_AUTHOR: &str = "/about/author/";
pub const ABOUT_TECH: &str = "/about/tech/";
pub const MEDIA_PREFIX: &str = "/media/";

pub fn group_list(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn profile_follow(username: &str) -> String {
    format!("/profile/{}/follow/", urlencoding::encode(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/profile/{}/unfollow/", urlencoding::encode(username))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

pub fn post_edit(post_id: i64) -> String {
    format!("/posts/{}/edit/", post_id)
}

pub fn add_comment(post_id: i64) -> String {
    format!("/posts/{}/comment/", post_id)
}

pub fn media(name: &str) -> String {
    let encoded: Vec<_> = name.split('/').map(urlencoding::encode).collect();
    format!("{}{}", MEDIA_PREFIX, encoded.join("/"))
}

/// Login page, remembering where to come back to.
pub fn login(next: Option<&str>) -> String {
    match next {
        Some(next) if !next.is_empty() => {
            format!("{}?next={}", LOGIN, urlencoding::encode(next))
        }
        _ => LOGIN.to_string(),
    }
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(next) if is_local_path(next) => next.to_string(),
        _ => INDEX.to_string(),
    }
}

// Browsers read `/\host` like `//host`, and drop tabs and newlines.
fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/') | Some('\\'))
        && !path.chars().any(|c| c.is_control())
}
