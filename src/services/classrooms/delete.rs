use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ClassroomService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
    classroom_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let role = RequireJWT::extract_user_role(request);
    let uid = RequireJWT::extract_user_id(request).unwrap_or_default();

    // 只有班级归属的教师或管理员可以删除
    let classroom = match storage.get_classroom_by_id(classroom_id).await {
        Ok(Some(classroom)) => classroom,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassroomNotFound,
                "Classroom not found",
            )));
        }
        Err(e) => {
            error!("Failed to get classroom {}: {}", classroom_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get classroom: {e}"),
                )),
            );
        }
    };

    if role != Some(UserRole::Admin) && classroom.teacher_id != uid {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassroomPermissionDenied,
            "You do not have permission to delete this classroom",
        )));
    }

    // 签到窗口还开着时不允许删除
    match storage
        .has_open_session(classroom_id, chrono::Utc::now())
        .await
    {
        Ok(true) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::SessionStillOpen,
                "Classroom has an open attendance session, stop it first",
            )));
        }
        Ok(false) => {}
        Err(e) => {
            error!("Failed to check open session: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to check open session: {e}"),
                )),
            );
        }
    }

    match storage.delete_classroom(classroom_id).await {
        Ok(true) => {
            info!("Classroom {} deleted by user {}", classroom_id, uid);
            Ok(HttpResponse::Ok()
                .json(ApiResponse::<()>::success_empty("Classroom deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
        Err(e) => {
            error!("Failed to delete classroom {}: {}", classroom_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomDeleteFailed,
                    format!("Failed to delete classroom: {e}"),
                )),
            )
        }
    }
}
