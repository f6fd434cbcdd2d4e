use super::entities::Membership;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 花名册列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/classroom-student.ts")]
pub struct RosterListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Membership>,
}
