//! Authentication handlers: login, logout, and current-user lookup.
//!
//! ```text
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"s3cret"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```
//!
//! Tokens are stateless. Login returns the token in the body and mirrors it
//! into an HttpOnly `access_token` cookie for browser clients; logout clears
//! that cookie.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CredentialValidationError, Error, IssuedToken, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{ACCESS_TOKEN_COOKIE, SessionUser};
use crate::inbound::http::state::{AuthCookieSettings, HttpState};
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{FieldName, credential_field_error};

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password).map_err(|err| {
            let field = match err {
                CredentialValidationError::EmptyEmail => FieldName::new("email"),
                CredentialValidationError::EmptyPassword
                | CredentialValidationError::PasswordTooLong { .. } => FieldName::new("password"),
            };
            credential_field_error(field, err)
        })
    }
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[schema(example = 1800)]
    pub expires_in: i64,
}

impl From<&IssuedToken> for TokenResponse {
    fn from(token: &IssuedToken) -> Self {
        Self {
            access_token: token.access_token.as_str().to_owned(),
            token_type: "bearer".to_owned(),
            expires_in: token.expires_in_seconds,
        }
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn access_token_cookie(value: String, settings: AuthCookieSettings) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .finish()
}

/// Authenticate with email and password and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "HttpOnly access_token cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account disabled", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let outcome = state.login.login(&credentials).await?;
    let body = TokenResponse::from(&outcome.token);

    let mut cookie = access_token_cookie(body.access_token.clone(), state.cookie);
    cookie.set_max_age(CookieDuration::seconds(outcome.token.expires_in_seconds));

    Ok(HttpResponse::Ok().cookie(cookie).json(body))
}

/// Clear the access-token cookie. Bearer tokens stay valid until expiry.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = MessageResponse)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    let mut cookie = access_token_cookie(String::new(), state.cookie);
    cookie.make_removal();
    HttpResponse::Ok().cookie(cookie).json(MessageResponse {
        message: "Logged out".to_owned(),
    })
}

/// Return the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("BearerAuth" = []))
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    caller: SessionUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_user(&caller, &caller.id).await?;
    Ok(web::Json(UserResponse::from(user)))
}
