//! Alerts API handlers.
//!
//! ```text
//! POST   /api/v1/alerts
//! GET    /api/v1/alerts?status=open&alertType=2
//! GET    /api/v1/alerts/{id}
//! PUT    /api/v1/alerts/{id}
//! DELETE /api/v1/alerts/{id}
//! ```
//!
//! Every route requires a bearer token. Alerts belonging to someone else are
//! reported as `404 Not Found` unless the caller is an admin.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Alert, AlertDescription, AlertDraft, AlertFilter, AlertPatch, AlertStatus, AlertTitle,
    AlertType, Error, PostalCode,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, alert_field_error, parse_alert_id};

fn parse_title(raw: &str) -> Result<AlertTitle, Error> {
    AlertTitle::new(raw).map_err(|err| alert_field_error(FieldName::new("title"), err))
}

fn parse_description(raw: String) -> Result<AlertDescription, Error> {
    AlertDescription::new(raw).map_err(|err| alert_field_error(FieldName::new("description"), err))
}

fn parse_alert_type(raw: i32) -> Result<AlertType, Error> {
    AlertType::new(raw).map_err(|err| alert_field_error(FieldName::new("alertType"), err))
}

fn parse_status(raw: &str) -> Result<AlertStatus, Error> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|err| alert_field_error(FieldName::new("status"), err))
}

fn parse_postal_code(raw: &str) -> Result<PostalCode, Error> {
    PostalCode::new(raw).map_err(|err| alert_field_error(FieldName::new("postalCode"), err))
}

/// Body for `POST /api/v1/alerts`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    #[schema(example = "Fallen tree on Elm Street")]
    pub title: String,
    #[schema(example = "Blocking both lanes near the school")]
    pub description: String,
    #[schema(example = 1, minimum = 0)]
    pub alert_type: i32,
    /// Defaults to `open`.
    #[schema(example = "open")]
    pub status: Option<String>,
    pub closing_date: Option<DateTime<Utc>>,
    #[schema(example = "H2X 1Y4")]
    pub postal_code: Option<String>,
}

impl TryFrom<CreateAlertRequest> for AlertDraft {
    type Error = Error;

    fn try_from(value: CreateAlertRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: parse_title(&value.title)?,
            description: parse_description(value.description)?,
            alert_type: parse_alert_type(value.alert_type)?,
            status: value
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?
                .unwrap_or_default(),
            closing_date: value.closing_date,
            postal_code: value.postal_code.as_deref().map(parse_postal_code).transpose()?,
        })
    }
}

/// Body for `PUT /api/v1/alerts/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub alert_type: Option<i32>,
    pub status: Option<String>,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<String>,
}

impl TryFrom<UpdateAlertRequest> for AlertPatch {
    type Error = Error;

    fn try_from(value: UpdateAlertRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.as_deref().map(parse_title).transpose()?,
            description: value.description.map(parse_description).transpose()?,
            alert_type: value.alert_type.map(parse_alert_type).transpose()?,
            status: value.status.as_deref().map(parse_status).transpose()?,
            closing_date: value.closing_date,
            postal_code: value.postal_code.as_deref().map(parse_postal_code).transpose()?,
        })
    }
}

/// Query string for `GET /api/v1/alerts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAlertsQuery {
    /// Only return alerts with this status (`open` or `resolved`).
    pub status: Option<String>,
    /// Only return alerts with this category code.
    pub alert_type: Option<i32>,
}

impl TryFrom<ListAlertsQuery> for AlertFilter {
    type Error = Error;

    fn try_from(value: ListAlertsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value.status.as_deref().map(parse_status).transpose()?,
            alert_type: value.alert_type.map(parse_alert_type).transpose()?,
        })
    }
}

/// Alert as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    #[schema(example = "9b2d4c1e-7f3a-4e6b-8c5d-2a1f0e9d8c7b")]
    pub id: String,
    /// Owning user's identifier.
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub alert_type: i32,
    #[schema(example = "open")]
    pub status: String,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id.to_string(),
            user_id: alert.owner.to_string(),
            title: alert.title.as_ref().to_owned(),
            description: alert.description.as_ref().to_owned(),
            alert_type: alert.alert_type.value(),
            status: alert.status.as_str().to_owned(),
            closing_date: alert.closing_date,
            postal_code: alert.postal_code.map(|code| code.as_ref().to_owned()),
            created_at: alert.created_at,
            updated_at: alert.updated_at,
        }
    }
}

/// Raise a new alert owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/alerts",
    request_body = CreateAlertRequest,
    responses(
        (status = 201, description = "Alert created", body = AlertResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "createAlert",
    security(("BearerAuth" = []))
)]
#[post("/alerts")]
pub async fn create_alert(
    state: web::Data<HttpState>,
    caller: SessionUser,
    payload: web::Json<CreateAlertRequest>,
) -> ApiResult<HttpResponse> {
    let draft = AlertDraft::try_from(payload.into_inner())?;
    let alert = state.alerts.create(&caller, draft).await?;
    Ok(HttpResponse::Created().json(AlertResponse::from(alert)))
}

/// List the caller's alerts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(ListAlertsQuery),
    responses(
        (status = 200, description = "Caller's alerts", body = [AlertResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "listAlerts",
    security(("BearerAuth" = []))
)]
#[get("/alerts")]
pub async fn list_alerts(
    state: web::Data<HttpState>,
    caller: SessionUser,
    query: web::Query<ListAlertsQuery>,
) -> ApiResult<web::Json<Vec<AlertResponse>>> {
    let filter = AlertFilter::try_from(query.into_inner())?;
    let alerts = state.alerts_query.list(&caller, filter).await?;
    Ok(web::Json(
        alerts.into_iter().map(AlertResponse::from).collect(),
    ))
}

/// Fetch one alert by id.
#[utoipa::path(
    get,
    path = "/api/v1/alerts/{id}",
    params(("id" = String, Path, description = "Alert identifier (UUID)")),
    responses(
        (status = 200, description = "Alert", body = AlertResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "getAlert",
    security(("BearerAuth" = []))
)]
#[get("/alerts/{id}")]
pub async fn get_alert(
    state: web::Data<HttpState>,
    caller: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<AlertResponse>> {
    let id = parse_alert_id(&path.into_inner(), FieldName::new("id"))?;
    let alert = state.alerts_query.get(&caller, &id).await?;
    Ok(web::Json(AlertResponse::from(alert)))
}

/// Partially update an alert.
#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}",
    params(("id" = String, Path, description = "Alert identifier (UUID)")),
    request_body = UpdateAlertRequest,
    responses(
        (status = 200, description = "Updated alert", body = AlertResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "updateAlert",
    security(("BearerAuth" = []))
)]
#[put("/alerts/{id}")]
pub async fn update_alert(
    state: web::Data<HttpState>,
    caller: SessionUser,
    path: web::Path<String>,
    payload: web::Json<UpdateAlertRequest>,
) -> ApiResult<web::Json<AlertResponse>> {
    let id = parse_alert_id(&path.into_inner(), FieldName::new("id"))?;
    let patch = AlertPatch::try_from(payload.into_inner())?;
    let alert = state.alerts.update(&caller, &id, patch).await?;
    Ok(web::Json(AlertResponse::from(alert)))
}

/// Soft-delete an alert.
#[utoipa::path(
    delete,
    path = "/api/v1/alerts/{id}",
    params(("id" = String, Path, description = "Alert identifier (UUID)")),
    responses(
        (status = 204, description = "Alert deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "deleteAlert",
    security(("BearerAuth" = []))
)]
#[delete("/alerts/{id}")]
pub async fn delete_alert(
    state: web::Data<HttpState>,
    caller: SessionUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_alert_id(&path.into_inner(), FieldName::new("id"))?;
    state.alerts.delete(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;
