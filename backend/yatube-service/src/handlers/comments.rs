/// Comment handler
use actix_web::{web, HttpResponse};

use super::posts::detail_context;
use super::redirect;
use crate::error::Result;
use crate::forms::{CommentForm, CommentFormView, Submission};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::templates;
use crate::urls;

/// Valid comments go back to the post; invalid ones re-show the post with
/// the error under the comment box.
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthUser,
    post_id: web::Path<i64>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    let form = form.into_inner();
    let submitted = form.text.clone();

    match state.comments.add(post_id, &user.0, form).await? {
        Submission::Accepted(_) => Ok(redirect(&urls::post_detail(post_id))),
        Submission::Rejected(errors) => {
            let detail = state.posts.detail(post_id).await?;
            let context = detail_context(
                &Some(user.0),
                detail,
                CommentFormView::rejected(&submitted, errors),
            );
            templates::render_page("posts/post_detail.html", &context)
        }
    }
}
