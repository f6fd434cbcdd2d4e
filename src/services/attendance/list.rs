use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AttendanceService;
use crate::models::attendance::requests::AttendanceListParams;
use crate::models::{ApiResponse, ErrorCode};

/// 缺省日期取当天（UTC）
pub(super) fn resolve_date(params: &AttendanceListParams) -> String {
    params
        .date
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string())
}

pub async fn list_records(
    service: &AttendanceService,
    request: &HttpRequest,
    classroom_id: i64,
    params: AttendanceListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(response) = service.ensure_owner(request, classroom_id).await {
        return Ok(response);
    }

    let date = resolve_date(&params);

    match storage.list_attendance(classroom_id, &date).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Attendance records retrieved successfully",
        ))),
        Err(e) => {
            error!(
                "Failed to list attendance for classroom {} on {}: {}",
                classroom_id, date, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to list attendance: {e}"),
                )),
            )
        }
    }
}
