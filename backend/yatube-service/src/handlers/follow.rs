/// Follow handlers - feed, follow and unfollow
use actix_web::{web, HttpResponse};

use super::{post_cards, redirect, AuthorLink};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::pagination::PageQuery;
use crate::state::AppState;
use crate::templates;
use crate::urls;

pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = state.follows.feed(&user.0, query.raw()).await?;
    let following: Vec<AuthorLink> = state
        .follows
        .following(&user.0)
        .await?
        .iter()
        .map(AuthorLink::from)
        .collect();

    let mut context = templates::page_context(&Some(user.0));
    context.insert("page_obj", &post_cards(page));
    context.insert("following", &following);
    templates::render_page("posts/follow.html", &context)
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = state.follows.follow(&user.0, &username).await?;
    Ok(redirect(&urls::profile(&author.username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = state.follows.unfollow(&user.0, &username).await?;
    Ok(redirect(&urls::profile(&author.username)))
}
