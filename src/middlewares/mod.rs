//! HTTP 中间件
//!
//! - [`RequireJWT`]：验证 Bearer token 并把当前用户放入请求扩展；
//! - [`RequireRole`]：在 RequireJWT 之后检查用户角色；
//! - [`RateLimit`]：按 IP / 用户限制请求频率。

pub mod rate_limit;
pub mod require_jwt;
pub mod require_role;

pub use rate_limit::RateLimit;
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

use crate::models::{ApiResponse, ErrorCode};

/// 构造统一信封格式的错误响应，供各中间件复用
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()>::error_empty(code, message))
}
