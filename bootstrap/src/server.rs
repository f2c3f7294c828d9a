//! 服务器
//!
//! gRPC、HTTP/JSON 网关、静态资源与内部端点共用一个监听端口

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use micro_config::{AppConfig, ServerConfig};
use micro_errors::{AppError, AppResult};
use micro_telemetry::prometheus_handle;
use tokio::net::TcpListener;
use tonic::service::RoutesBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::gateway::endpoint_channel;
use crate::health::{HealthChecker, InternalPaths, internal_routes};
use crate::metrics::track_metrics;
use crate::reflection::build_reflection;
use crate::runtime::shutdown_signal;
use crate::service::Service;
use crate::web::{self, WebConfig};

/// 通用服务器
///
/// # 示例
///
/// ```ignore
/// use std::sync::Arc;
/// use micro_bootstrap::Server;
///
/// Server::from_env()?
///     .with_web("/", "web", "index.html")
///     .listen_and_serve(vec![Arc::new(MyService::new())])
///     .await?;
/// ```
pub struct Server {
    config: ServerConfig,
    web: Option<WebConfig>,
    reflection: bool,
    health: Arc<HealthChecker>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let reflection = config.reflection;
        Self {
            config,
            web: None,
            reflection,
            health: Arc::new(HealthChecker::new()),
        }
    }

    /// 从环境变量读取配置创建服务器
    pub fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env().map_err(|e| AppError::config(e.to_string()))?;
        Ok(Self::new(config.server))
    }

    /// 在 `prefix` 下提供 `dir` 中的静态资源，`index` 为首页
    pub fn with_web(
        mut self,
        prefix: impl Into<String>,
        dir: impl Into<PathBuf>,
        index: impl Into<String>,
    ) -> Self {
        self.web = Some(WebConfig::new(prefix, dir, index));
        self
    }

    /// 覆盖配置中的 gRPC 反射开关
    pub fn with_reflection(mut self, enabled: bool) -> Self {
        self.reflection = enabled;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn health_checker(&self) -> Arc<HealthChecker> {
        self.health.clone()
    }

    /// 绑定配置的地址并服务，直到收到 Ctrl+C / SIGTERM
    pub async fn listen_and_serve(self, services: Vec<Arc<dyn Service>>) -> AppResult<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| AppError::config(e.to_string()))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::bind(addr.to_string(), e))?;

        self.serve_with_listener(listener, services, shutdown_signal())
            .await
    }

    /// 在已绑定的 listener 上服务，直到 `shutdown` 完成
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        services: Vec<Arc<dyn Service>>,
        shutdown: F,
    ) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::internal(format!("Failed to read local address: {}", e)))?;

        let app = self.router(local_addr, &services)?;

        let names: Vec<&str> = services.iter().map(|s| s.name()).collect();
        info!(addr = %local_addr, services = ?names, "Server listening");

        let health = self.health.clone();
        health.set_ready(true);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                health.set_ready(false);
                info!("Graceful shutdown started");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

        info!("Server stopped");

        Ok(())
    }

    /// 构建完整路由
    ///
    /// `local_addr` 是网关拨号的 gRPC 端点地址，需在 tokio 运行时内调用
    pub fn router(&self, local_addr: SocketAddr, services: &[Arc<dyn Service>]) -> AppResult<Router> {
        // 1. gRPC
        let mut routes = RoutesBuilder::default();
        let mut descriptor_sets = Vec::new();
        for service in services {
            service.register(&mut routes);
            if let Some(fds) = service.file_descriptor_set() {
                descriptor_sets.push(fds);
            }
            info!(service = service.name(), "gRPC service registered");
        }

        if self.reflection && !descriptor_sets.is_empty() {
            routes.add_service(build_reflection(descriptor_sets)?);
            info!("gRPC reflection enabled");
        }

        let grpc = routes.routes().into_axum_router();

        // 2. HTTP/JSON 网关
        let channel = endpoint_channel(local_addr)?;
        let mut http = Router::new();
        for service in services {
            if let Some(gateway) = service.register_with_endpoint(channel.clone()) {
                http = http.merge(gateway);
                info!(service = service.name(), "HTTP gateway registered");
            }
        }

        // 3. 内部端点
        let metrics = prometheus_handle()
            .map_err(|e| AppError::internal(format!("Failed to install metrics recorder: {}", e)))?;
        let paths = InternalPaths {
            health: self.config.health_check_path.clone(),
            readiness: self.config.readiness_path.clone(),
            metrics: self.config.metrics_path.clone(),
        };
        http = http.merge(internal_routes(&paths, self.health.clone(), metrics));

        // 超时只作用于 HTTP 路由，gRPC 调用由客户端的 grpc-timeout 控制
        let http = http.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(self.config.request_timeout_secs),
        ));
        let mut app = grpc.merge(http);

        // 4. 静态资源
        if let Some(web) = &self.web {
            if !web.index_path().is_file() {
                warn!(index = %web.index_path().display(), "Web index file not found");
            }
            app = web::mount(app, web);
            info!(prefix = %web.prefix, dir = %web.dir.display(), "Web assets mounted");
        }

        Ok(app
            .layer(middleware::from_fn(track_metrics))
            .layer(TraceLayer::new_for_http()))
    }
}
