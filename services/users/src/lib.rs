//! usersrv - Users 微服务
//!
//! gRPC 服务 `users.v1.Users` 及其 HTTP/JSON 网关，由 micro-bootstrap 托管

pub mod api;

pub use api::UserServer;
