//! micro-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范，同时负责 gRPC 状态码与 HTTP 状态码之间的映射

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// 下游 gRPC 调用返回的原始状态
    #[error("{message}")]
    Rpc { code: tonic::Code, message: String },
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unimplemented(msg: impl Into<String>) -> Self {
        Self::Unimplemented(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// 从 gRPC 状态构造（网关转换使用），保留原始状态码
    pub fn from_status(status: &tonic::Status) -> Self {
        Self::Rpc {
            code: status.code(),
            message: status.message().to_string(),
        }
    }

    /// 转换为 gRPC 状态码
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::NotFound(_) => tonic::Code::NotFound,
            Self::Validation(_) => tonic::Code::InvalidArgument,
            Self::Unauthenticated(_) => tonic::Code::Unauthenticated,
            Self::Forbidden(_) => tonic::Code::PermissionDenied,
            Self::Conflict(_) => tonic::Code::AlreadyExists,
            Self::Unimplemented(_) => tonic::Code::Unimplemented,
            Self::Unavailable(_) => tonic::Code::Unavailable,
            Self::Internal(_) => tonic::Code::Internal,
            Self::Config(_) => tonic::Code::Internal,
            Self::Bind { .. } => tonic::Code::Internal,
            Self::Rpc { code, .. } => *code,
        }
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        http_status_from_grpc_code(self.grpc_code())
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        let code = self.grpc_code();
        ProblemDetails {
            r#type: format!("/problems/{}", problem_slug(code)),
            title: problem_title(code).to_string(),
            status: self.status_code(),
            detail: self.detail(),
            instance: None,
            grpc_code: code as i32,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// gRPC 状态码 -> HTTP 状态码
///
/// 与 grpc-gateway 的默认映射保持一致
pub fn http_status_from_grpc_code(code: tonic::Code) -> u16 {
    use tonic::Code;

    match code {
        Code::Ok => 200,
        Code::Cancelled => 499,
        Code::Unknown => 500,
        Code::InvalidArgument => 400,
        Code::DeadlineExceeded => 504,
        Code::NotFound => 404,
        Code::AlreadyExists => 409,
        Code::PermissionDenied => 403,
        Code::ResourceExhausted => 429,
        Code::FailedPrecondition => 400,
        Code::Aborted => 409,
        Code::OutOfRange => 400,
        Code::Unimplemented => 501,
        Code::Internal => 500,
        Code::Unavailable => 503,
        Code::DataLoss => 500,
        Code::Unauthenticated => 401,
    }
}

fn problem_slug(code: tonic::Code) -> &'static str {
    use tonic::Code;

    match code {
        Code::NotFound => "not-found",
        Code::InvalidArgument | Code::OutOfRange => "validation",
        Code::Unauthenticated => "unauthenticated",
        Code::PermissionDenied => "forbidden",
        Code::AlreadyExists | Code::Aborted => "conflict",
        Code::Unimplemented => "not-implemented",
        Code::Unavailable => "unavailable",
        Code::DeadlineExceeded => "timeout",
        Code::ResourceExhausted => "resource-exhausted",
        Code::FailedPrecondition => "failed-precondition",
        Code::Cancelled => "cancelled",
        _ => "internal",
    }
}

fn problem_title(code: tonic::Code) -> &'static str {
    use tonic::Code;

    match code {
        Code::NotFound => "Resource Not Found",
        Code::InvalidArgument | Code::OutOfRange => "Validation Error",
        Code::Unauthenticated => "Unauthenticated",
        Code::PermissionDenied => "Forbidden",
        Code::AlreadyExists | Code::Aborted => "Conflict",
        Code::Unimplemented => "Not Implemented",
        Code::Unavailable => "Service Unavailable",
        Code::DeadlineExceeded => "Gateway Timeout",
        Code::ResourceExhausted => "Resource Exhausted",
        Code::FailedPrecondition => "Failed Precondition",
        Code::Cancelled => "Request Cancelled",
        _ => "Internal Server Error",
    }
}

impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Rpc { code, message } => tonic::Status::new(code, message),
            other => tonic::Status::new(other.grpc_code(), other.to_string()),
        }
    }
}

impl From<tonic::Status> for AppError {
    fn from(status: tonic::Status) -> Self {
        Self::from_status(&status)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let problem = self.to_problem_details();
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [("content-type", "application/problem+json")],
            Json(problem),
        )
            .into_response()
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// 对应的 gRPC 状态码数值
    pub grpc_code: i32,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unimplemented_maps_to_501() {
        let err = AppError::unimplemented("method GetUser not implemented");
        assert_eq!(err.grpc_code(), tonic::Code::Unimplemented);
        assert_eq!(err.status_code(), 501);
    }

    #[test]
    fn test_status_round_trip_keeps_code() {
        let status = tonic::Status::deadline_exceeded("too slow");
        let err = AppError::from_status(&status);
        assert_eq!(err.status_code(), 504);

        let back: tonic::Status = err.into();
        assert_eq!(back.code(), tonic::Code::DeadlineExceeded);
        assert_eq!(back.message(), "too slow");
    }

    #[test]
    fn test_problem_details_for_rpc_error() {
        let err = AppError::from(tonic::Status::unimplemented("method ListUsers not implemented"));
        let problem = err.to_problem_details();
        assert_eq!(problem.status, 501);
        assert_eq!(problem.title, "Not Implemented");
        assert_eq!(problem.r#type, "/problems/not-implemented");
        assert_eq!(problem.detail, "method ListUsers not implemented");
        assert_eq!(problem.grpc_code, tonic::Code::Unimplemented as i32);
    }

    #[test]
    fn test_http_status_table() {
        use tonic::Code;

        assert_eq!(http_status_from_grpc_code(Code::NotFound), 404);
        assert_eq!(http_status_from_grpc_code(Code::InvalidArgument), 400);
        assert_eq!(http_status_from_grpc_code(Code::FailedPrecondition), 400);
        assert_eq!(http_status_from_grpc_code(Code::Aborted), 409);
        assert_eq!(http_status_from_grpc_code(Code::Cancelled), 499);
        assert_eq!(http_status_from_grpc_code(Code::Unavailable), 503);
        assert_eq!(http_status_from_grpc_code(Code::DataLoss), 500);
    }

    #[test]
    fn test_bind_error_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = AppError::bind("127.0.0.1:8000", io);
        assert_eq!(err.grpc_code(), tonic::Code::Internal);
        assert!(err.to_string().contains("127.0.0.1:8000"));
    }

    #[tokio::test]
    async fn test_into_response_uses_problem_json() {
        let response = AppError::not_found("user 42").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
    }
}
