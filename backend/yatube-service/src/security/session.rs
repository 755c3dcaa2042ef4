//! Session tokens.
//!
//! A login issues an HS256 JWT carrying the user id and username. The token
//! travels in an HTTP-only cookie and is checked on every request by
//! `middleware::SessionMiddleware`.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::middleware::SessionUser;
use crate::models::User;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material and cookie settings for sessions.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cookie_name: String,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            cookie_name: config.cookie_name.clone(),
            ttl: Duration::hours(config.ttl_hours.max(1)),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a session token for `user`.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)?)
    }

    /// Decode a session token. Expired, tampered or malformed tokens yield
    /// `None`: the request simply continues as anonymous.
    pub fn verify(&self, token: &str) -> Option<SessionUser> {
        let validation = Validation::new(JWT_ALGORITHM);
        let data = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                return None;
            }
        };

        let id = data.claims.sub.parse::<i64>().ok()?;
        Some(SessionUser {
            id,
            username: data.claims.username,
        })
    }

    /// Cookie carrying a freshly issued token.
    pub fn login_cookie(&self, user: &User) -> Result<Cookie<'static>> {
        let token = self.issue(user)?;
        Ok(Cookie::build(self.cookie_name.clone(), token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.ttl.num_seconds()))
            .finish())
    }

    /// Cookie that makes the browser drop the session.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish();
        cookie.make_removal();
        cookie
    }
}
