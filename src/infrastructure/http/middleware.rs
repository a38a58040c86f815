//! HTTP Middleware
//!
//! 协议层错误日志（业务错误走 errno，在 ApiError::into_response() 中记录）

use std::time::Instant;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// 记录 4xx / 5xx 响应及耗时
///
/// 413 单独记录，便于排查样本上传超限
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(
            method = %method,
            uri = %uri,
            elapsed_ms,
            "Request body exceeds upload limit"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::DefaultBodyLimit,
        http::Request as HttpRequest,
        routing::{get, post},
        Router,
    };
    use tower::util::ServiceExt;

    async fn upload_handler(body: axum::body::Bytes) -> String {
        body.len().to_string()
    }

    async fn failing_handler() -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/upload", post(upload_handler))
            .route("/fail", get(failing_handler))
            .layer(DefaultBodyLimit::max(16))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    fn upload(size: usize) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/upload")
            .body(Body::from(vec![0u8; size]))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passes_successful_responses_through() {
        let response = create_test_router().oneshot(upload(8)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let response = create_test_router().oneshot(upload(64)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_route_and_server_error_keep_status() {
        let not_found = create_test_router()
            .oneshot(HttpRequest::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let failed = create_test_router()
            .oneshot(HttpRequest::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
    }
}
