//! Users Service - 服务入口
//!
//! 配置全部来自环境变量，见 micro-config

use std::sync::Arc;

use micro_bootstrap::{Server, Service, init_runtime};
use micro_config::AppConfig;
use micro_errors::AppResult;
use tracing::{error, info};
use usersrv::UserServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 配置无效时先用默认日志配置启动，错误由 Server::from_env 报告
    let config = AppConfig::from_env().unwrap_or_default();
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    if let Err(e) = run().await {
        error!(error = %e, "Server failed");
        return Err(e.into());
    }

    Ok(())
}

async fn run() -> AppResult<()> {
    let services: Vec<Arc<dyn Service>> = vec![Arc::new(UserServer::new())];

    Server::from_env()?
        .with_web("/", "web", "index.html")
        .listen_and_serve(services)
        .await
}
