//! Metrics 模块
//!
//! 为 gRPC 与 HTTP 请求记录 Prometheus 指标

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};

/// 请求协议
pub fn protocol_of(headers: &HeaderMap) -> &'static str {
    let is_grpc = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/grpc"))
        .unwrap_or(false);

    if is_grpc { "grpc" } else { "http" }
}

/// 记录请求
pub fn record_request(protocol: &str, method: &str, path: &str, status: &str, duration_ms: f64) {
    let labels = [
        ("protocol", protocol.to_string()),
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_ms", &labels).record(duration_ms);
}

/// 请求指标中间件
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let protocol = protocol_of(request.headers());
    let method = request.method().to_string();

    // gRPC 方法路径是有限集合，HTTP 只用路由模板，避免标签基数爆炸
    let path = if protocol == "grpc" {
        request.uri().path().to_string()
    } else {
        request
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "unmatched".to_string())
    };

    let response = next.run(request).await;

    let status = if protocol == "grpc" {
        response
            .headers()
            .get("grpc-status")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("0")
            .to_string()
    } else {
        response.status().as_u16().to_string()
    };

    record_request(
        protocol,
        &method,
        &path,
        &status,
        start.elapsed().as_secs_f64() * 1000.0,
    );

    response
}
