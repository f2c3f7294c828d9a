//! API layer - gRPC service implementation and HTTP/JSON gateway

pub mod gateway;
mod service;

pub use service::UserServer;

pub mod proto {
    tonic::include_proto!("users.v1");

    /// File descriptor set for gRPC reflection
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("users_descriptor");
}
