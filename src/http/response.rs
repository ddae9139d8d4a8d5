//! Responses generated by the server itself.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

/// Plain-text error page such as `403 Forbidden`.
pub fn error_response(status: StatusCode) -> Response<Body> {
    let body = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
