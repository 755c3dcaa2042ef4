//! Application factory shared by `main` and the HTTP tests.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use tracing_actix_web::TracingLogger;

use crate::error::AppError;
use crate::handlers::fallback::page_not_found;
use crate::middleware::SessionMiddleware;
use crate::routes;
use crate::state::AppState;

pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let sessions = state.sessions.clone();
    let store = state.store.clone();

    App::new()
        .app_data(state)
        // `/posts/abc/` is simply a page that does not exist
        .app_data(web::PathConfig::default().error_handler(|err, req| {
            AppError::NotFound(format!("{}: {}", req.path(), err)).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, req| {
            AppError::Validation(format!("{}?{}: {}", req.path(), req.query_string(), err)).into()
        }))
        .wrap(SessionMiddleware::new(sessions, store))
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::route().to(page_not_found))
}
