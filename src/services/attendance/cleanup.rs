use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AttendanceService;
use crate::errors::AttendanceError;
use crate::models::{ApiResponse, ErrorCode};

// 清理班级的历史会话与签到记录
//
// 仍有开放中的会话时拒绝，教师要先 stop（或等窗口到点）。
pub async fn cleanup_sessions(
    service: &AttendanceService,
    request: &HttpRequest,
    classroom_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(response) = service.ensure_owner(request, classroom_id).await {
        return Ok(response);
    }

    let lock = service.classroom_lock(classroom_id);
    let _guard = lock.lock().await;

    let now = chrono::Utc::now();

    match storage.cleanup_sessions(classroom_id, now).await {
        Ok(response) => {
            info!(
                "Cleaned up classroom {}: {} sessions, {} records",
                classroom_id, response.deleted_sessions, response.deleted_attendance
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Attendance history cleaned up",
            )))
        }
        Err(AttendanceError::SessionConflict(msg)) => {
            Ok(HttpResponse::Conflict()
                .json(ApiResponse::error_empty(ErrorCode::SessionStillOpen, msg)))
        }
        Err(e) => {
            error!("Failed to clean up classroom {}: {}", classroom_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to clean up sessions: {e}"),
                )),
            )
        }
    }
}
