/// Static "about" pages
use actix_web::HttpResponse;

use crate::error::Result;
use crate::middleware::Viewer;
use crate::templates;

pub async fn author(viewer: Viewer) -> Result<HttpResponse> {
    templates::render_page("about/author.html", &templates::page_context(&viewer.0))
}

pub async fn tech(viewer: Viewer) -> Result<HttpResponse> {
    templates::render_page("about/tech.html", &templates::page_context(&viewer.0))
}
