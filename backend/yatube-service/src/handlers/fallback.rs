/// Not-found page for every unmatched route
use actix_web::{HttpRequest, HttpResponse};

use crate::middleware::Viewer;
use crate::templates;

pub async fn page_not_found(req: HttpRequest, viewer: Viewer) -> HttpResponse {
    let mut context = templates::page_context(&viewer.0);
    context.insert("path", req.path());

    match templates::render("core/404.html", &context) {
        Ok(body) => HttpResponse::NotFound()
            .content_type(mime::TEXT_HTML_UTF_8)
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "not-found page rendering failed");
            HttpResponse::NotFound().finish()
        }
    }
}
