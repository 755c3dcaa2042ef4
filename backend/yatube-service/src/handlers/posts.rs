/// Post handlers - listings, detail, create and edit pages
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use tera::Context;

use super::{post_cards, redirect, CommentView, PostCard};
use crate::cache::page_key;
use crate::error::Result;
use crate::forms::{CommentFormView, PostForm, PostFormView, Submission};
use crate::metrics::record_cache_event;
use crate::middleware::{AuthUser, SessionUser, Viewer};
use crate::models::{Group, Post};
use crate::pagination::PageQuery;
use crate::services::{EditAccess, PostDetail};
use crate::state::AppState;
use crate::templates;
use crate::urls;

const INDEX_CACHE_PREFIX: &str = "index";

/// Index page. Rendered pages are served from the page cache while fresh;
/// cache failures fall back to rendering.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let key = page_key(INDEX_CACHE_PREFIX, path_and_query, viewer.user());

    match state.page_cache.get(&key).await {
        Ok(Some(body)) => {
            record_cache_event("hit");
            return Ok(templates::html(body));
        }
        Ok(None) => record_cache_event("miss"),
        Err(e) => {
            record_cache_event("error");
            tracing::warn!(error = %e, "index cache lookup failed");
        }
    }

    let page = state.posts.index(query.raw()).await?;
    let mut context = templates::page_context(&viewer.0);
    context.insert("page_obj", &post_cards(page));
    let body = templates::render("posts/index.html", &context)?;

    if let Err(e) = state.page_cache.set(&key, &body).await {
        tracing::warn!(error = %e, "index cache store failed");
    }
    Ok(templates::html(body))
}

pub async fn group_list(
    state: web::Data<AppState>,
    viewer: Viewer,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (group, page) = state.posts.group_posts(&slug, query.raw()).await?;

    let mut context = templates::page_context(&viewer.0);
    context.insert("group", &group);
    context.insert("page_obj", &post_cards(page));
    templates::render_page("posts/group_list.html", &context)
}

#[derive(Debug, Serialize)]
struct AuthorView {
    username: String,
    display_name: String,
    posts_count: usize,
    url: String,
    follow_url: String,
    unfollow_url: String,
}

pub async fn profile(
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let profile = state
        .posts
        .profile(&username, query.raw(), viewer.user())
        .await?;

    let author = AuthorView {
        display_name: profile.author.display_name(),
        posts_count: profile.posts_count,
        url: urls::profile(&profile.author.username),
        follow_url: urls::profile_follow(&profile.author.username),
        unfollow_url: urls::profile_unfollow(&profile.author.username),
        username: profile.author.username.clone(),
    };
    let show_follow_controls = viewer
        .user()
        .map(|user| user.id != profile.author.id)
        .unwrap_or(false);

    let mut context = templates::page_context(&viewer.0);
    context.insert("author", &author);
    context.insert("following", &profile.following);
    context.insert("show_follow_controls", &show_follow_controls);
    context.insert("page_obj", &post_cards(profile.page));
    templates::render_page("posts/profile.html", &context)
}

pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: Viewer,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let detail = state.posts.detail(*post_id).await?;
    let context = detail_context(&viewer.0, detail, CommentFormView::blank());
    templates::render_page("posts/post_detail.html", &context)
}

/// Context of the detail page; also used to re-show a rejected comment.
pub(crate) fn detail_context(
    viewer: &Option<SessionUser>,
    detail: PostDetail,
    comment_form: CommentFormView,
) -> Context {
    let is_author = viewer
        .as_ref()
        .map(|user| detail.post.is_authored_by(user.id))
        .unwrap_or(false);
    let comments: Vec<CommentView> = detail.comments.iter().map(CommentView::from).collect();

    let mut context = templates::page_context(viewer);
    context.insert("post", &PostCard::from(&detail.post));
    context.insert("author_posts_count", &detail.author_posts_count);
    context.insert("comments", &comments);
    context.insert("comment_form", &comment_form);
    context.insert("comment_url", &urls::add_comment(detail.post.id));
    context.insert("is_author", &is_author);
    context
}

fn form_context(
    user: &SessionUser,
    form: &PostFormView,
    groups: &[Group],
    action: &str,
    editing: Option<&Post>,
) -> Context {
    let mut context = templates::page_context(&Some(user.clone()));
    context.insert("form", form);
    context.insert("groups", groups);
    context.insert("form_action", action);
    if let Some(post) = editing {
        context.insert("is_edit", &true);
        context.insert("post_id", &post.id);
    }
    context
}

pub async fn post_create_form(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let groups = state.posts.groups().await?;
    let context = form_context(&user.0, &PostFormView::blank(), &groups, urls::POST_CREATE, None);
    templates::render_page("posts/create_post.html", &context)
}

pub async fn post_create(
    state: web::Data<AppState>,
    user: AuthUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = PostForm::from_multipart(payload, state.config.media.max_upload_bytes).await?;
    let mut view = PostFormView::rejected(&form, Default::default());

    match state.posts.create(&user.0, form).await? {
        Submission::Accepted(_) => Ok(redirect(&urls::profile(&user.0.username))),
        Submission::Rejected(errors) => {
            view.errors = errors;
            let groups = state.posts.groups().await?;
            let context = form_context(&user.0, &view, &groups, urls::POST_CREATE, None);
            templates::render_page("posts/create_post.html", &context)
        }
    }
}

pub async fn post_edit_form(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = match state.posts.editable(*post_id, &user.0).await? {
        EditAccess::Allowed(post) => post,
        EditAccess::Denied(post) => return Ok(redirect(&urls::post_detail(post.id))),
    };

    let groups = state.posts.groups().await?;
    let context = form_context(
        &user.0,
        &PostFormView::for_post(&post),
        &groups,
        &urls::post_edit(post.id),
        Some(&post),
    );
    templates::render_page("posts/create_post.html", &context)
}

pub async fn post_edit(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let post = match state.posts.editable(*post_id, &user.0).await? {
        EditAccess::Allowed(post) => post,
        EditAccess::Denied(post) => return Ok(redirect(&urls::post_detail(post.id))),
    };

    let form = PostForm::from_multipart(payload, state.config.media.max_upload_bytes).await?;
    let mut view = PostFormView::rejected(&form, Default::default());

    match state.posts.update(&post, form).await? {
        Submission::Accepted(updated) => Ok(redirect(&urls::post_detail(updated.id))),
        Submission::Rejected(errors) => {
            view.errors = errors;
            view.image_url = post.image.as_deref().map(urls::media);
            view.image_name = post.image.clone();
            let groups = state.posts.groups().await?;
            let context = form_context(
                &user.0,
                &view,
                &groups,
                &urls::post_edit(post.id),
                Some(&post),
            );
            templates::render_page("posts/create_post.html", &context)
        }
    }
}
