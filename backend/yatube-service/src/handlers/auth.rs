/// Account handlers - signup, login and logout
use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use tera::Context;

use crate::error::Result;
use crate::forms::{signup_fields, FormErrors, LoginForm, SignupForm, Submission, BAD_CREDENTIALS};
use crate::middleware::Viewer;
use crate::models::User;
use crate::state::AppState;
use crate::templates;
use crate::urls;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn signup_context(viewer: &Viewer, form: &SignupForm, errors: &FormErrors) -> Context {
    let mut context = templates::page_context(&viewer.0);
    context.insert("fields", &signup_fields(form, errors));
    context.insert("form", &serde_json::json!({ "errors": errors }));
    context
}

fn login_context(viewer: &Viewer, username: &str, next: Option<&str>, error: Option<&str>) -> Context {
    let mut context = templates::page_context(&viewer.0);
    context.insert("username", username);
    context.insert("next", next.unwrap_or(""));
    context.insert("error", &error);
    context
}

/// Log `user` in and send them to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> Result<HttpResponse> {
    let cookie = state.sessions.login_cookie(user)?;
    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((header::LOCATION, location))
        .finish())
}

pub async fn signup_form(viewer: Viewer) -> Result<HttpResponse> {
    let context = signup_context(&viewer, &SignupForm::default(), &FormErrors::new());
    templates::render_page("users/signup.html", &context)
}

pub async fn signup(
    state: web::Data<AppState>,
    viewer: Viewer,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    match state.accounts.signup(form.clone()).await? {
        Submission::Accepted(user) => start_session(&state, &user, urls::INDEX),
        Submission::Rejected(errors) => {
            let context = signup_context(&viewer, &form, &errors);
            templates::render_page("users/signup.html", &context)
        }
    }
}

pub async fn login_form(viewer: Viewer, query: web::Query<NextQuery>) -> Result<HttpResponse> {
    let context = login_context(&viewer, "", query.next.as_deref(), None);
    templates::render_page("users/login.html", &context)
}

pub async fn login(
    state: web::Data<AppState>,
    viewer: Viewer,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    match state.accounts.authenticate(&form.username, &form.password).await? {
        Some(user) => {
            tracing::info!(user_id = user.id, "user logged in");
            let next = urls::safe_next(form.next.as_deref());
            start_session(&state, &user, &next)
        }
        None => {
            let context = login_context(
                &viewer,
                &form.username,
                form.next.as_deref(),
                Some(BAD_CREDENTIALS),
            );
            templates::render_page("users/login.html", &context)
        }
    }
}

pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse> {
    let body = templates::render("users/logged_out.html", &templates::page_context(&None))?;
    Ok(HttpResponse::Ok()
        .cookie(state.sessions.logout_cookie())
        .content_type(mime::TEXT_HTML_UTF_8)
        .body(body))
}
