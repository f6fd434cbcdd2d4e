use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::AttendanceService;
use crate::errors::AttendanceError;
use crate::middlewares::RequireJWT;
use crate::models::attendance::requests::SubmitAttendanceRequest;
use crate::models::{ApiResponse, ErrorCode};

// 学生提交签到
//
// 窗口判定与去重都在存储层完成：窗口以锁内取到的 now 判定，
// 重复提交靠账本唯一索引在插入时原子拒绝，这里只做翻译。
pub async fn submit(
    service: &AttendanceService,
    request: &HttpRequest,
    classroom_id: i64,
    submit_request: SubmitAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Unauthorized: missing user",
            )));
        }
    };

    if let Err(response) = service.ensure_member(request, classroom_id, user.id).await {
        return Ok(response);
    }

    // 照片凭证必须指向一个已上传成功的文件
    match storage.get_file_by_token(&submit_request.photo_token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "Photo token does not reference an uploaded file",
            )));
        }
        Err(e) => {
            error!("Failed to resolve photo token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to resolve photo token: {e}"),
                )),
            );
        }
    }

    let lock = service.classroom_lock(classroom_id);
    let _guard = lock.lock().await;

    let now = chrono::Utc::now();
    let scope = service.get_config().attendance.ledger_scope;

    match storage
        .submit_attendance(
            classroom_id,
            user.id,
            user.display_name(),
            &submit_request.photo_token,
            scope,
            now,
        )
        .await
    {
        Ok(record) => {
            info!(
                "Student {} checked in to classroom {} (session {})",
                user.id, classroom_id, record.session_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                record,
                "Attendance submitted successfully",
            )))
        }
        Err(AttendanceError::SessionClosed(msg)) => {
            warn!(
                "Rejected late submission from student {} in classroom {}",
                user.id, classroom_id
            );
            Ok(HttpResponse::Conflict()
                .json(ApiResponse::error_empty(ErrorCode::SessionClosed, msg)))
        }
        Err(AttendanceError::DuplicateSubmission(msg)) => {
            warn!(
                "Rejected duplicate submission from student {} in classroom {}",
                user.id, classroom_id
            );
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::DuplicateSubmission,
                msg,
            )))
        }
        Err(e) => {
            error!(
                "Failed to submit attendance for student {} in classroom {}: {}",
                user.id, classroom_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::AttendanceSubmitFailed,
                    format!("Failed to submit attendance: {e}"),
                )),
            )
        }
    }
}
