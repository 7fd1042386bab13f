use axum::{
    http::{header, HeaderMap, HeaderName, Method, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Log each request on entry and its status on exit.
pub async fn request_logging_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = request.headers();

    if method == Method::POST {
        info!(
            %method,
            %uri,
            user_agent = header_str(headers, &header::USER_AGENT),
            content_type = header_str(headers, &header::CONTENT_TYPE),
            content_length = header_str(headers, &header::CONTENT_LENGTH),
            "Request received"
        );
    } else {
        info!(
            %method,
            %uri,
            user_agent = header_str(headers, &header::USER_AGENT),
            "Request received"
        );
    }

    let started = Instant::now();
    let response = next.run(request).await;

    info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Response sent"
    );

    response
}
