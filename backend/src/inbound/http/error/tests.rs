//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn body_json(error: &Error) -> (actix_web::http::header::HeaderMap, Value) {
    let response = ResponseError::error_response(error);
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&bytes).expect("JSON body");
    (headers, value)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "secret": "x" }));

    let (headers, body) = body_json(&error).await;

    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["code"], "internal_error");
    assert!(body.get("details").is_none());
    assert_eq!(body["traceId"], expected_trace_id.as_str());
    assert_eq!(
        headers.get(TRACE_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some(expected_trace_id.as_str())
    );
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(expected_trace_id: String) {
    let error = Error::conflict("email already in use")
        .with_trace_id(expected_trace_id)
        .with_details(json!({ "field": "email" }));

    let (_, body) = body_json(&error).await;

    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "email already in use");
    assert_eq!(body["details"]["field"], "email");
}

#[rstest]
#[actix_web::test]
async fn unauthorized_responses_advertise_bearer_scheme() {
    let (headers, _) = body_json(&Error::unauthorized("missing token")).await;
    assert_eq!(
        headers.get("WWW-Authenticate").and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
}

#[rstest]
#[actix_web::test]
async fn missing_trace_id_omits_header() {
    let (headers, body) = body_json(&Error::not_found("missing")).await;
    assert!(headers.get(TRACE_ID_HEADER).is_none());
    assert!(body.get("traceId").is_none());
}
