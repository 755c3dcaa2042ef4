/// Error types for Yatube
///
/// Every failure a handler can hit is expressed as an `AppError`. Errors are
/// converted to HTML responses (or redirects) by the `ResponseError` impl, so
/// handlers can use `?` all the way down.
///
/// Form validation problems are NOT errors here: they are rendered back into
/// the form by the handlers (see `forms::FormErrors`).
use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use thiserror::Error;

use crate::templates;
use crate::urls;

/// Result type for yatube operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Media storage error: {0}")]
    Media(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous access to a page that needs a session.
    #[error("Login required for {next}")]
    LoginRequired { next: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Template(_)
            | AppError::Media(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::LoginRequired { next } => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, urls::login(Some(next))))
                    .finish();
            }
            AppError::NotFound(what) => {
                tracing::debug!(%what, "rendering not-found page");
            }
            AppError::Validation(_) | AppError::Conflict(_) => {
                tracing::warn!(error = %self, "request rejected");
            }
            _ => {
                tracing::error!(error = %self, "request failed");
            }
        }

        let template = match status {
            StatusCode::NOT_FOUND => "core/404.html",
            StatusCode::BAD_REQUEST => "core/400.html",
            _ => "core/500.html",
        };

        let mut context = templates::page_context(&None);
        context.insert("path", "");
        match templates::render(template, &context) {
            Ok(body) => HttpResponse::build(status)
                .content_type(mime::TEXT_HTML_UTF_8)
                .body(body),
            Err(e) => {
                tracing::error!("Error page rendering failed: {}", e);
                HttpResponse::build(status)
                    .content_type(mime::TEXT_PLAIN_UTF_8)
                    .body(status.canonical_reason().unwrap_or("Error"))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Cache(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        // tera nests the useful part of the message in `source`
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        AppError::Template(message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Media(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::Validation(format!("malformed multipart body: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("session token error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::NotFound("post".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::LoginRequired {
                next: "/create/".into()
            }
            .status_code(),
            StatusCode::FOUND
        );
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn login_required_redirects_with_next() {
        let resp = AppError::LoginRequired {
            next: "/posts/1/edit/".into(),
        }
        .error_response();

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/auth/login/?next=%2Fposts%2F1%2Fedit%2F");
    }

    #[actix_web::test]
    async fn not_found_renders_dedicated_page() {
        let resp = AppError::NotFound("group".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<title>Страница не найдена</title>"));
    }
}
