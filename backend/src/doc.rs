//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP endpoint from the inbound layer together
//! with the request/response schemas they reference. Domain types stay free
//! of utoipa derives; [`ErrorSchema`] and [`ErrorCodeSchema`] stand in for
//! them.
//!
//! The document is served at `/api-docs/openapi.json` alongside Swagger UI
//! and exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::alerts::{AlertResponse, CreateAlertRequest, UpdateAlertRequest};
use crate::inbound::http::auth::{LoginRequest, MessageResponse, TokenResponse};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{ChangePasswordRequest, RegisterRequest, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer-token security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token from POST /api/v1/auth/login. The access_token cookie \
                         set by the same endpoint is accepted as a fallback.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CommunAlert API",
        description = "Community alerts: account registration, bearer-token authentication, \
                       and owner-scoped alert management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::alerts::create_alert,
        crate::inbound::http::alerts::list_alerts,
        crate::inbound::http::alerts::get_alert,
        crate::inbound::http::alerts::update_alert,
        crate::inbound::http::alerts::delete_alert,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::welcome::welcome,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        UserResponse,
        ChangePasswordRequest,
        LoginRequest,
        TokenResponse,
        MessageResponse,
        CreateAlertRequest,
        UpdateAlertRequest,
        AlertResponse,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Account registration and profiles"),
        (name = "auth", description = "Login, logout, and the current caller"),
        (name = "alerts", description = "Owner-scoped community alerts"),
        (name = "health", description = "Probes and service greeting")
    )
)]
pub struct ApiDoc;
