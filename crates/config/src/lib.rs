//! micro-config - 配置加载库
//!
//! 所有配置均来自进程环境变量（启动时会先尝试读取当前目录下的 `.env`）

use std::net::SocketAddr;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 顶层环境变量
const APP_KEYS: &[&str] = &["app_name", "app_env", "log_level"];

/// 映射到 `server.*` 的环境变量
const SERVER_KEYS: &[&str] = &[
    "address",
    "health_check_path",
    "readiness_path",
    "metrics_path",
    "request_timeout_secs",
    "reflection",
];

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，gRPC 与 HTTP 共用同一端口
    pub address: String,
    pub health_check_path: String,
    pub readiness_path: String,
    pub metrics_path: String,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否开启 gRPC 反射
    pub reflection: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8000".to_string(),
            health_check_path: "/internal/health".to_string(),
            readiness_path: "/internal/readiness".to_string(),
            metrics_path: "/internal/metrics".to_string(),
            request_timeout_secs: 30,
            reflection: true,
        }
    }
}

impl ServerConfig {
    /// 解析监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("address {:?}: {}", self.address, e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        for (name, path) in [
            ("health_check_path", &self.health_check_path),
            ("readiness_path", &self.readiness_path),
            ("metrics_path", &self.metrics_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must start with '/': {:?}",
                    name, path
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub log_level: String,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "usersrv".to_string(),
            app_env: "development".to_string(),
            log_level: "info".to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 `.env` 和环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env 不存在时忽略
        let _ = dotenvy::dotenv();

        Self::from_figment(Self::figment())
    }

    /// 默认值 + 环境变量
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::raw().only(APP_KEYS))
            .merge(
                Env::raw()
                    .only(SERVER_KEYS)
                    .map(|key| format!("server.{}", key).into()),
            )
    }

    /// 从任意 figment 提取并校验配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.server.validate()?;
        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_figment(Figment::from(Serialized::defaults(
            AppConfig::default(),
        )))
        .unwrap();

        assert_eq!(config.app_name, "usersrv");
        assert!(config.is_development());
        assert_eq!(config.server.address, "0.0.0.0:8000");
        assert_eq!(config.server.health_check_path, "/internal/health");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.server.reflection);
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("ADDRESS", "127.0.0.1:9090");
            jail.set_env("APP_ENV", "production");
            jail.set_env("REQUEST_TIMEOUT_SECS", "5");
            jail.set_env("REFLECTION", "false");

            let config = AppConfig::from_env().expect("config should load");
            assert_eq!(config.server.address, "127.0.0.1:9090");
            assert!(config.is_production());
            assert_eq!(config.server.request_timeout_secs, 5);
            assert!(!config.server.reflection);
            assert_eq!(config.server.metrics_path, "/internal/metrics");
            Ok(())
        });
    }

    #[test]
    fn test_unrelated_env_is_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("SERVER_NAME", "ignored");
            jail.set_env("PORT", "1234");

            let config = AppConfig::from_env().expect("config should load");
            assert_eq!(config.server.address, "0.0.0.0:8000");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_address_rejected() {
        let figment = AppConfig::figment().merge(("server.address", "not-an-address"));
        let err = AppConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_timeout_type_rejected() {
        let figment = AppConfig::figment().merge(("server.request_timeout_secs", "soon"));
        let err = AppConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_paths_must_be_absolute() {
        let config = ServerConfig {
            health_check_path: "health".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
