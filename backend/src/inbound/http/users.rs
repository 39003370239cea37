//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"email":"ada@example.com","password":"s3cret"}
//! GET  /api/v1/users
//! GET  /api/v1/users/{id}
//! PUT  /api/v1/users/me/password {"currentPassword":"...","newPassword":"..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, PasswordChange, PersonName, PlainPassword, Registration, User,
    UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, credential_field_error, parse_user_id, user_field_error,
};

/// Registration body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "ada_l")]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: String,
}

/// Treat absent and blank optional inputs alike.
fn optional_field<T>(
    value: Option<String>,
    field: FieldName,
    parse: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<Option<T>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse(raw).map_err(|err| user_field_error(field, err)))
        .transpose()
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(&value.email)
            .map_err(|err| user_field_error(FieldName::new("email"), err))?;
        let username = optional_field(value.username, FieldName::new("username"), |raw| {
            Username::new(raw.trim())
        })?;
        let first_name =
            optional_field(value.first_name, FieldName::new("firstName"), PersonName::new)?;
        let last_name =
            optional_field(value.last_name, FieldName::new("lastName"), PersonName::new)?;
        let password = PlainPassword::new(&value.password)
            .map_err(|err| credential_field_error(FieldName::new("password"), err))?;
        Ok(Self {
            email,
            username,
            first_name,
            last_name,
            password,
        })
    }
}

/// Public representation of a user. The password hash never leaves the
/// domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "member")]
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.map(|name| name.as_ref().to_owned()),
            email: user.email.as_ref().to_owned(),
            first_name: user.first_name.map(|name| name.as_ref().to_owned()),
            last_name: user.last_name.map(|name| name.as_ref().to_owned()),
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body for `PUT /api/v1/users/me/password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        let current = PlainPassword::new(&value.current_password)
            .map_err(|err| credential_field_error(FieldName::new("currentPassword"), err))?;
        let replacement = PlainPassword::new(&value.new_password)
            .map_err(|err| credential_field_error(FieldName::new("newPassword"), err))?;
        Ok(Self {
            current,
            replacement,
        })
    }
}

/// Register a new member account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email or username already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// List every account. Requires the admin role.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("BearerAuth" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: SessionUser,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users(&caller).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch a single account. Members may only read their own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("BearerAuth" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let user = state.users.get_user(&caller, &id).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Change the caller's password after re-checking the current one.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword",
    security(("BearerAuth" = []))
)]
#[put("/users/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: SessionUser,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.accounts.change_password(&caller, change).await?;
    Ok(HttpResponse::NoContent().finish())
}
