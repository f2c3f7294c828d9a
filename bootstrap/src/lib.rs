//! micro-bootstrap - 统一服务启动骨架
//!
//! 所有服务复用的启动逻辑：同一端口上的 gRPC、HTTP/JSON 网关、静态资源与内部端点

pub mod gateway;
pub mod health;
pub mod metrics;
mod reflection;
mod runtime;
mod server;
mod service;
mod shutdown;
pub mod web;

pub use reflection::*;
pub use runtime::*;
pub use server::*;
pub use service::*;
pub use shutdown::*;
