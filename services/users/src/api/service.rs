//! Users gRPC 服务

use axum::Router;
use micro_bootstrap::Service;
use tonic::server::NamedService;
use tonic::service::RoutesBuilder;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

use super::gateway;
use super::proto::users_client::UsersClient;
use super::proto::users_server::{Users, UsersServer};
use super::proto::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse, GetUserRequest,
    GetUserResponse, ListUsersRequest, ListUsersResponse, UpdateUserRequest, UpdateUserResponse,
    FILE_DESCRIPTOR_SET,
};

/// Users 服务实现
///
/// 目前所有方法都返回 `Unimplemented`，业务逻辑按方法逐个补上即可
#[derive(Debug, Clone, Default)]
pub struct UserServer {}

impl UserServer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_implemented<T>(method: &str) -> Result<Response<T>, Status> {
    Err(Status::unimplemented(format!(
        "method {} not implemented",
        method
    )))
}

#[tonic::async_trait]
impl Users for UserServer {
    async fn create_user(
        &self,
        _request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        not_implemented("CreateUser")
    }

    async fn get_user(
        &self,
        _request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        not_implemented("GetUser")
    }

    async fn list_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        not_implemented("ListUsers")
    }

    async fn update_user(
        &self,
        _request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        not_implemented("UpdateUser")
    }

    async fn delete_user(
        &self,
        _request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        not_implemented("DeleteUser")
    }
}

impl Service for UserServer {
    fn name(&self) -> &'static str {
        UsersServer::<UserServer>::NAME
    }

    fn register(&self, routes: &mut RoutesBuilder) {
        routes.add_service(UsersServer::new(self.clone()));
    }

    fn register_with_endpoint(&self, channel: Channel) -> Option<Router> {
        Some(gateway::routes(UsersClient::new(channel)))
    }

    fn file_descriptor_set(&self) -> Option<&'static [u8]> {
        Some(FILE_DESCRIPTOR_SET)
    }
}
