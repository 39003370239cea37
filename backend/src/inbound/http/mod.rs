//! HTTP inbound adapter exposing REST endpoints.

pub mod alerts;
pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;
pub mod welcome;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Largest JSON body accepted by the API.
const JSON_PAYLOAD_LIMIT: usize = 64 * 1024;

/// Build the `/api/v1` scope with every versioned route and extractor
/// configuration that maps malformed input onto `invalid_request`.
///
/// The caller registers [`state::HttpState`] as app data.
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_PAYLOAD_LIMIT)
                .error_handler(error::json_error_handler),
        )
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::register)
        .service(users::list_users)
        .service(users::change_password)
        .service(users::get_user)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(alerts::create_alert)
        .service(alerts::list_alerts)
        .service(alerts::get_alert)
        .service(alerts::update_alert)
        .service(alerts::delete_alert)
}
