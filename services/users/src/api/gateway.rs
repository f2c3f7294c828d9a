//! Users HTTP/JSON 网关
//!
//! 把 REST 风格的 HTTP 请求转换成对 gRPC 端点的调用

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use micro_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tonic::Status;
use tonic::metadata::MetadataValue;
use tonic::transport::Channel;
use tracing::debug;

use super::proto::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest, ListUsersResponse,
    UpdateUserRequest, User, users_client::UsersClient,
};

/// 透传给 gRPC 的请求头
const FORWARDED_HEADERS: &[&str] = &["authorization", "x-request-id"];

type Client = UsersClient<Channel>;

pub fn routes(client: Client) -> Router {
    Router::new()
        .route("/api/v1/users", post(create_user).get(list_users))
        .route(
            "/api/v1/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(client)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserBody {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListUsersQuery {
    pub page_size: i32,
    pub page_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: Option<UserDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
    pub next_page_token: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<Option<User>> for UserEnvelope {
    fn from(user: Option<User>) -> Self {
        Self {
            user: user.map(UserDto::from),
        }
    }
}

impl From<ListUsersResponse> for UserListDto {
    fn from(response: ListUsersResponse) -> Self {
        Self {
            users: response.users.into_iter().map(UserDto::from).collect(),
            next_page_token: response.next_page_token,
        }
    }
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}

impl From<ListUsersQuery> for ListUsersRequest {
    fn from(query: ListUsersQuery) -> Self {
        Self {
            page_size: query.page_size,
            page_token: query.page_token,
        }
    }
}

fn update_request(id: String, body: UpdateUserBody) -> UpdateUserRequest {
    UpdateUserRequest {
        id,
        name: body.name,
        email: body.email,
    }
}

/// 构造 gRPC 请求并透传白名单内的请求头
fn grpc_request<T>(message: T, headers: &HeaderMap) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    for name in FORWARDED_HEADERS {
        let value = headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<MetadataValue<_>>().ok());
        if let Some(value) = value {
            request.metadata_mut().insert(*name, value);
        }
    }
    request
}

fn rpc_error(rpc: &'static str) -> impl FnOnce(Status) -> AppError {
    move |status| {
        debug!(rpc, code = ?status.code(), message = status.message(), "gRPC call failed");
        AppError::from_status(&status)
    }
}

async fn create_user(
    State(mut client): State<Client>,
    headers: HeaderMap,
    Json(body): Json<CreateUserBody>,
) -> AppResult<(StatusCode, Json<UserEnvelope>)> {
    let response = client
        .create_user(grpc_request(CreateUserRequest::from(body), &headers))
        .await
        .map_err(rpc_error("CreateUser"))?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope::from(response.into_inner().user)),
    ))
}

async fn get_user(
    State(mut client): State<Client>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<UserEnvelope>> {
    let response = client
        .get_user(grpc_request(GetUserRequest { id }, &headers))
        .await
        .map_err(rpc_error("GetUser"))?;

    Ok(Json(UserEnvelope::from(response.into_inner().user)))
}

async fn list_users(
    State(mut client): State<Client>,
    headers: HeaderMap,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<UserListDto>> {
    let response = client
        .list_users(grpc_request(ListUsersRequest::from(query), &headers))
        .await
        .map_err(rpc_error("ListUsers"))?;

    Ok(Json(UserListDto::from(response.into_inner())))
}

async fn update_user(
    State(mut client): State<Client>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> AppResult<Json<UserEnvelope>> {
    let response = client
        .update_user(grpc_request(update_request(id, body), &headers))
        .await
        .map_err(rpc_error("UpdateUser"))?;

    Ok(Json(UserEnvelope::from(response.into_inner().user)))
}

async fn delete_user(
    State(mut client): State<Client>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    client
        .delete_user(grpc_request(DeleteUserRequest { id }, &headers))
        .await
        .map_err(rpc_error("DeleteUser"))?;

    Ok(StatusCode::NO_CONTENT)
}
