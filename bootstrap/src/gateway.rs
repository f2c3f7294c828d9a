//! HTTP/JSON 网关的 gRPC 端点

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use micro_errors::{AppError, AppResult};
use tonic::transport::{Channel, Endpoint};

/// 网关拨号地址
///
/// 监听在未指定地址（0.0.0.0 / ::）时改为回环地址
pub fn dial_addr(listen_addr: SocketAddr) -> SocketAddr {
    let ip = match listen_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, listen_addr.port())
}

/// 创建指向本服务器 gRPC 端点的懒连接 channel
///
/// 首次调用时才建立连接，因此注册网关本身不会失败。
/// 必须在 tokio 运行时内调用。
pub fn endpoint_channel(listen_addr: SocketAddr) -> AppResult<Channel> {
    let uri = format!("http://{}", dial_addr(listen_addr));
    let endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| AppError::internal(format!("Invalid gateway endpoint {}: {}", uri, e)))?;
    Ok(endpoint.connect_lazy())
}
