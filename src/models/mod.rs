//! 数据模型定义
//!
//! 按领域拆分：每个领域下分为 entities（业务实体）、requests（请求体）、
//! responses（响应体）。通用的响应信封与分页类型在 common 中。

pub mod attendance;
pub mod auth;
pub mod classroom_students;
pub mod classrooms;
pub mod common;
pub mod files;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::{ApiResponse, HealthResponse};

/// 程序启动时间，用于健康检查接口计算运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务状态码，随响应信封返回
///
/// 0 表示成功；4xx/5xx 与 HTTP 语义对应；1xxx 用户、2xxx 班级、
/// 3xxx 签到、4xxx 文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    RateLimitExceeded = 429,
    InternalServerError = 500,

    // 用户
    AuthFailed = 1001,
    RegisterFailed = 1002,
    UserNotFound = 1003,
    UserAlreadyExists = 1004,
    UserNameAlreadyExists = 1005,
    UserEmailAlreadyExists = 1006,
    UserNameInvalid = 1007,
    UserEmailInvalid = 1008,
    UserPasswordInvalid = 1009,

    // 班级
    ClassroomNotFound = 2001,
    ClassroomCreationFailed = 2002,
    ClassCodeAlreadyExists = 2003,
    ClassCodeInvalid = 2004,
    ClassroomJoinFailed = 2005,
    ClassroomPermissionDenied = 2006,
    ClassroomDeleteFailed = 2007,

    // 签到
    SessionAlreadyOpen = 3001,
    SessionClosed = 3002,
    SessionNotFound = 3003,
    DuplicateSubmission = 3004,
    AttendanceSubmitFailed = 3005,
    SessionStillOpen = 3006,

    // 文件
    FileUploadFailed = 4001,
    FileNotFound = 4002,
    FileTypeNotAllowed = 4003,
    FileSizeExceeded = 4004,
    MultifileUploadNotAllowed = 4005,
}
