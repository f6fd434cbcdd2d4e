use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 凭班级码加入班级请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom-student.ts")]
pub struct JoinClassroomRequest {
    pub class_code: String,
}

// 花名册查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom-student.ts")]
pub struct RosterListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 花名册查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom-student.ts")]
pub struct RosterQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}
