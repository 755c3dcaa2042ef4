/// Uploaded media files
use actix_web::{http::header, web, HttpResponse};

use crate::error::{AppError, Result};
use crate::state::AppState;

pub async fn serve_media(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let name = path.into_inner();
    let (bytes, content_type) = state
        .media
        .open(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("media file '{}'", name)))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
