use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AttendanceService;
use crate::models::attendance::responses::StopSessionResponse;
use crate::models::{ApiResponse, ErrorCode};

// 停止会话是幂等的：会话已经关闭（或超时自动关闭）时
// 再次调用同样返回最近一次会话的最终名单。
pub async fn stop_session(
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

    match storage.stop_session(classroom_id, now).await {
        Ok(final_entries) => {
            info!(
                "Attendance session stopped for classroom {}, {} entries",
                classroom_id,
                final_entries.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                StopSessionResponse { final_entries },
                "Attendance session stopped",
            )))
        }
        Err(e) => {
            error!(
                "Failed to stop session for classroom {}: {}",
                classroom_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to stop session: {e}"),
                )),
            )
        }
    }
}
