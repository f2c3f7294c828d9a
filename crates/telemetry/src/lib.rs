//! micro-telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// 初始化 tracing
///
/// `RUST_LOG` 优先于传入的日志级别
pub fn init_tracing(log_level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// 获取全局 Prometheus handle
///
/// recorder 在进程内只安装一次，之后的调用复用同一个 handle
pub fn prometheus_handle() -> Result<PrometheusHandle, BuildError> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_handle_is_shared() {
        let first = prometheus_handle().expect("recorder should install");
        metrics::counter!("telemetry_test_total").increment(3);

        let second = prometheus_handle().expect("second call reuses recorder");
        let rendered = second.render();
        assert!(rendered.contains("telemetry_test_total 3"));
        assert_eq!(first.render(), rendered);
    }

    #[test]
    fn test_second_tracing_init_is_an_error_not_a_panic() {
        let _ = init_tracing("debug");
        assert!(init_tracing_json("info").is_err());
    }
}
