//! 健康检查模块
//!
//! 提供存活、就绪与 metrics 三个内部端点

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

/// 健康检查状态
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub checks: Vec<ComponentHealth>,
}

/// 组件健康状态
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            checks: vec![],
        }
    }

    pub fn add_check(&mut self, check: ComponentHealth) {
        if check.status != "healthy" {
            self.status = "unhealthy".to_string();
        }
        self.checks.push(check);
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "healthy".to_string(),
            message: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 健康检查器
///
/// 服务器开始接收请求时置为就绪，收到关闭信号后取消就绪
#[derive(Debug, Default)]
pub struct HealthChecker {
    ready: AtomicBool,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 存活检查：进程在运行即视为健康
    pub fn liveness(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    /// 就绪检查
    pub fn readiness(&self) -> HealthStatus {
        let mut status = HealthStatus::healthy();
        if self.is_ready() {
            status.add_check(ComponentHealth::healthy("server"));
        } else {
            status.add_check(ComponentHealth::unhealthy("server", "Not serving"));
        }
        status
    }
}

/// 内部端点路径
#[derive(Debug, Clone)]
pub struct InternalPaths {
    pub health: String,
    pub readiness: String,
    pub metrics: String,
}

#[derive(Clone)]
struct InternalState {
    checker: Arc<HealthChecker>,
    metrics: PrometheusHandle,
}

/// 构建内部端点路由
pub fn internal_routes(
    paths: &InternalPaths,
    checker: Arc<HealthChecker>,
    metrics: PrometheusHandle,
) -> Router {
    Router::new()
        .route(&paths.health, get(health_handler))
        .route(&paths.readiness, get(ready_handler))
        .route(&paths.metrics, get(metrics_handler))
        .with_state(InternalState { checker, metrics })
}

/// Liveness 端点处理器
async fn health_handler(State(state): State<InternalState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.checker.liveness()))
}

/// Readiness 端点处理器
async fn ready_handler(State(state): State<InternalState>) -> impl IntoResponse {
    let status = state.checker.readiness();
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Metrics 端点处理器
async fn metrics_handler(State(state): State<InternalState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_follows_flag() {
        let checker = HealthChecker::new();
        assert!(checker.liveness().is_healthy());

        let status = checker.readiness();
        assert!(!status.is_healthy());
        assert_eq!(status.checks[0].message.as_deref(), Some("Not serving"));

        checker.set_ready(true);
        assert!(checker.readiness().is_healthy());

        checker.set_ready(false);
        assert!(!checker.readiness().is_healthy());
    }

    #[test]
    fn test_unhealthy_check_flips_status() {
        let mut status = HealthStatus::healthy();
        status.add_check(ComponentHealth::healthy("a"));
        assert!(status.is_healthy());
        status.add_check(ComponentHealth::unhealthy("b", "down"));
        assert!(!status.is_healthy());
        assert_eq!(status.checks.len(), 2);
    }
}
