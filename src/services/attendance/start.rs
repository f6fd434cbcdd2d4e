use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AttendanceService;
use crate::errors::AttendanceError;
use crate::models::{ApiResponse, ErrorCode};

pub async fn start_session(
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
    let duration = service.get_config().session_duration();

    match storage.start_session(classroom_id, now, duration).await {
        Ok(session) => {
            info!(
                "Attendance session {} started for classroom {}, deadline {}",
                session.id, classroom_id, session.deadline
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                session,
                "Attendance session started",
            )))
        }
        Err(AttendanceError::SessionConflict(msg)) => {
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::SessionAlreadyOpen,
                msg,
            )))
        }
        Err(e) => {
            error!(
                "Failed to start session for classroom {}: {}",
                classroom_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to start session: {e}"),
                )),
            )
        }
    }
}
