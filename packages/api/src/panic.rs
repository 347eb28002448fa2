// ABOUTME: Converts handler panics into the standard PlanKit error body
// ABOUTME: The panic payload is logged under a request id and never returned to the client

use std::any::Any;

use axum::{http::StatusCode, response::Response};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::error::ErrorResponse;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn create_panic_handler() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(recover_panic as PanicHandler)
}

fn panic_payload(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload")
}

fn recover_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let body = ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred");

    error!(
        request_id = %body.request_id,
        panic = %panic_payload(payload.as_ref()),
        "Handler panicked"
    );

    body.into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}
