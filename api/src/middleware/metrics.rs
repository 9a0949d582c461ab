use axum::{extract::Request, middleware::Next, response::Response};

/// Count every request by method and response status
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let response = next.run(req).await;
    common::telemetry::record_http_request(&method, response.status().as_u16());
    response
}
