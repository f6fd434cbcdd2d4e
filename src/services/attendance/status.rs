use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AttendanceService;
use crate::middlewares::RequireJWT;
use crate::models::attendance::responses::SessionStatusResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

// 会话状态查询，轮询热路径
//
// 不拿班级锁，也不触发落库：开放与否用 is_open_at 现算，
// 已过期但还没被写路径收尾的会话在这里同样表现为 Closed。
pub async fn session_status(
    service: &AttendanceService,
    request: &HttpRequest,
    classroom_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let role = RequireJWT::extract_user_role(request);
    let uid = RequireJWT::extract_user_id(request).unwrap_or_default();

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

    // 归属教师和管理员直接放行，学生需要在花名册上
    if role != Some(UserRole::Admin) && classroom.teacher_id != uid {
        match storage.get_membership(classroom_id, uid).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomPermissionDenied,
                    "You are not enrolled in this classroom",
                )));
            }
            Err(e) => {
                error!("Failed to check membership: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to check membership: {e}"),
                    )),
                );
            }
        }
    }

    let now = chrono::Utc::now();

    let response = match storage.get_open_session(classroom_id).await {
        Ok(Some(session)) if session.is_open_at(now) => SessionStatusResponse {
            is_open: true,
            time_remaining: session.time_remaining_at(now),
            session_id: Some(session.id),
            deadline: Some(session.deadline),
        },
        Ok(_) => SessionStatusResponse::closed(),
        Err(e) => {
            error!(
                "Failed to get session status for classroom {}: {}",
                classroom_id, e
            );
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get session status: {e}"),
                )),
            );
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Session status retrieved successfully",
    )))
}
