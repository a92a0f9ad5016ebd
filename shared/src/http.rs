//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;

use crate::models::JsonResponse;
use crate::Error;

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(Box::new)?;

    Ok(response)
}

/// Create an error envelope with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &JsonResponse::error(message))
}

/// Render a gateway error as an error envelope with its mapped status.
pub fn failure_response(err: &Error) -> Result<Response<Body>, lambda_http::Error> {
    error_response(err.status_code(), err.to_string())
}

/// Create a plain-text response.
pub fn text_response(status: u16, text: &str) -> Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(text.to_string()))
        .map_err(Box::new)?;

    Ok(response)
}
