//! Bearer-token extraction for protected handlers.
//!
//! The token is read from the `Authorization: Bearer` header, falling back to
//! the `access_token` cookie set at login. Verification is delegated to the
//! [`TokenVerifier`](crate::domain::ports::TokenVerifier) port held in
//! [`HttpState`], so handlers only see an [`AuthenticatedUser`].

use std::ops::Deref;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde_json::json;

use crate::domain::{AuthenticatedUser, Error};
use crate::inbound::http::state::HttpState;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

const BEARER_PREFIX: &str = "bearer ";

fn strip_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let prefix = trimmed.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    trimmed
        .get(BEARER_PREFIX.len()..)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Locate the raw token on the request, header first.
pub(crate) fn token_from_request(req: &HttpRequest) -> Result<String, Error> {
    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let value = header.to_str().map_err(|_| {
            Error::unauthorized("authorization header is not valid ASCII")
                .with_details(json!({ "code": "malformed_token" }))
        })?;
        return strip_bearer(value).map(str::to_owned).ok_or_else(|| {
            Error::unauthorized("authorization header must use the Bearer scheme")
                .with_details(json!({ "code": "malformed_token" }))
        });
    }

    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value();
        let token = strip_bearer(value).unwrap_or(value).trim();
        if !token.is_empty() {
            return Ok(token.to_owned());
        }
    }

    Err(Error::unauthorized("authentication required")
        .with_details(json!({ "code": "missing_token" })))
}

/// Authenticated caller resolved from the request's bearer token.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(AuthenticatedUser);

impl SessionUser {
    /// Unwrap into the domain identity.
    pub fn into_inner(self) -> AuthenticatedUser {
        self.0
    }
}

impl Deref for SessionUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = token_from_request(req);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            state.tokens.verify(&token).await.map(SessionUser)
        })
    }
}
