//! 服务注册约定
//!
//! 业务服务通过实现 [`Service`] 接入统一的启动骨架

use axum::Router;
use tonic::service::RoutesBuilder;
use tonic::transport::Channel;

/// 可被 [`Server`](crate::Server) 托管的服务
///
/// `register` 是必需的：把 gRPC 服务注册到路由上。
/// 其余方法都有默认实现，未覆盖时该服务只通过 gRPC 暴露。
pub trait Service: Send + Sync {
    /// 服务名称（用于日志）
    fn name(&self) -> &'static str;

    /// 注册原生 gRPC 服务
    fn register(&self, routes: &mut RoutesBuilder);

    /// 注册 HTTP/JSON 网关
    ///
    /// `channel` 指向本服务器自身的 gRPC 端点（懒连接），
    /// 网关处理器通过它把 HTTP 请求转成 gRPC 调用。
    fn register_with_endpoint(&self, _channel: Channel) -> Option<Router> {
        None
    }

    /// 编码后的 FileDescriptorSet，用于 gRPC 反射
    fn file_descriptor_set(&self) -> Option<&'static [u8]> {
        None
    }
}
