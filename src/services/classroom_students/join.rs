use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ClassroomStudentService;
use crate::middlewares::RequireJWT;
use crate::models::classroom_students::requests::JoinClassroomRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn join_classroom(
    service: &ClassroomStudentService,
    request: &HttpRequest,
    join_request: JoinClassroomRequest,
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

    // 凭班级码找班级，找不到不区分“码不存在”与“格式不对”
    let classroom = match storage.get_classroom_by_code(&join_request.class_code).await {
        Ok(Some(classroom)) => classroom,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassroomNotFound,
                "No classroom found for this class code",
            )));
        }
        Err(e) => {
            error!("Failed to look up class code: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomJoinFailed,
                    format!("Failed to join classroom: {e}"),
                )),
            );
        }
    };

    // 重复加入是幂等的
    match storage
        .enroll_student(
            classroom.id,
            user.id,
            user.display_name(),
            chrono::Utc::now(),
        )
        .await
    {
        Ok(membership) => {
            info!(
                "Student {} joined classroom {} ({})",
                user.id, classroom.id, classroom.class_code
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                membership,
                "Joined classroom successfully",
            )))
        }
        Err(e) => {
            error!("Failed to enroll student {}: {}", user.id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomJoinFailed,
                    format!("Failed to join classroom: {e}"),
                )),
            )
        }
    }
}
