use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级成员（花名册条目）
//
// 花名册只增不减：加入后没有退出路径，重复加入返回已有记录。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom-student.ts")]
pub struct Membership {
    pub id: i64,
    pub classroom_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
