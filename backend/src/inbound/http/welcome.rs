//! Root endpoint greeting API consumers.

use actix_web::{get, web};

use crate::inbound::http::auth::MessageResponse;

/// Greeting returned by `GET /`.
#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Welcome message", body = MessageResponse))
)]
#[get("/")]
pub async fn welcome() -> web::Json<MessageResponse> {
    web::Json(MessageResponse {
        message: "Welcome to CommunAlert API".to_owned(),
    })
}
