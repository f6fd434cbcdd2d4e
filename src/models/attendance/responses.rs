use super::entities::AttendanceRecord;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 会话状态响应
//
// is_open 与 time_remaining 都在请求时现算；
// deadline 一并返回，客户端用它在两次轮询之间做本地倒计时。
// 轮询客户端（watcher）也要解码它，所以同时实现反序列化。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct SessionStatusResponse {
    pub is_open: bool,
    pub time_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
}

impl SessionStatusResponse {
    /// 当前没有会话（或上一个已关闭）时的状态
    pub fn closed() -> Self {
        Self {
            is_open: false,
            time_remaining: 0,
            session_id: None,
            deadline: None,
        }
    }
}

// 停止会话响应：返回最终签到名单
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct StopSessionResponse {
    pub final_entries: Vec<AttendanceRecord>,
}

// 签到记录列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceRecord>,
    pub total: i64,
}

// 清理已完成会话的响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct CleanupSessionResponse {
    pub deleted_sessions: i64,
    pub deleted_attendance: i64,
}
