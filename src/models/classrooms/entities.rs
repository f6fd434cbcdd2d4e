use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级实体
//
// class_code 全局唯一，入库前统一转为大写；查找时大小写不敏感。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom.ts")]
pub struct Classroom {
    pub id: i64,
    pub course_name: String,
    pub class_code: String,
    pub teacher_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
