use super::entities::{UserProfile, UserRole};
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求（注册与启动时管理员种子共用）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub profile: UserProfile,
}
