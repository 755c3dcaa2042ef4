use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;

use crate::db::Store;
use crate::error::AppError;
use crate::security::SessionKeys;

/// Logged-in user decoded from the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Session middleware
///
/// Never rejects a request: a missing or invalid cookie, or a token for a
/// user the store no longer knows, leaves the request anonymous. Pages that
/// need a login use the `AuthUser` extractor.
pub struct SessionMiddleware {
    keys: Arc<SessionKeys>,
    store: Arc<dyn Store>,
}

impl SessionMiddleware {
    pub fn new(keys: Arc<SessionKeys>, store: Arc<dyn Store>) -> Self {
        Self { keys, store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
            store: self.store.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<SessionKeys>,
    store: Arc<dyn Store>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();

        let claimed = req
            .cookie(self.keys.cookie_name())
            .and_then(|cookie| self.keys.verify(cookie.value()));

        Box::pin(async move {
            if let Some(claimed) = claimed {
                match store.find_user(claimed.id).await? {
                    // ids can be reused after a restart of the in-memory store
                    Some(user) if user.username == claimed.username => {
                        req.extensions_mut().insert(SessionUser {
                            id: user.id,
                            username: user.username,
                        });
                    }
                    _ => {
                        tracing::debug!(user_id = claimed.id, "session for unknown user ignored");
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// The current visitor; `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<SessionUser>);

impl Viewer {
    pub fn user(&self) -> Option<&SessionUser> {
        self.0.as_ref()
    }
}

impl actix_web::FromRequest for Viewer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ready(Ok(Viewer(req.extensions().get::<SessionUser>().cloned())))
    }
}

/// A logged-in visitor. Anonymous requests are redirected to the login
/// page with `next` pointing back at the requested path.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl actix_web::FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<SessionUser>() {
            Some(user) => ready(Ok(AuthUser(user.clone()))),
            None => {
                let next = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| req.path().to_string());
                ready(Err(AppError::LoginRequired { next }))
            }
        }
    }
}
