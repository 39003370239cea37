//! Wires outbound adapters into the domain services behind `HttpState`.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use communalert::domain::{AccountService, AlertService};
use communalert::inbound::http::state::{AuthCookieSettings, HttpState, HttpStatePorts};
use communalert::outbound::crypto::{Argon2PasswordHasher, JwtTokenService};
use communalert::outbound::persistence::{DbPool, DieselAlertRepository, DieselUserRepository};

use super::AuthConfig;

/// Build the shared HTTP state over PostgreSQL, Argon2, and JWT adapters.
pub(super) fn build_http_state(pool: &DbPool, auth: &AuthConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenService::new(
        &auth.jwt_secret,
        auth.token_ttl,
        clock.clone(),
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        tokens,
        clock.clone(),
    ));
    let alerts = Arc::new(AlertService::new(
        Arc::new(DieselAlertRepository::new(pool.clone())),
        clock,
    ));

    web::Data::new(HttpState::new(
        HttpStatePorts {
            login: accounts.clone(),
            tokens: accounts.clone(),
            accounts: accounts.clone(),
            users: accounts,
            alerts: alerts.clone(),
            alerts_query: alerts,
        },
        AuthCookieSettings {
            secure: auth.cookie_secure,
        },
    ))
}
