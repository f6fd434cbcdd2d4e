use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomStudentService;
use crate::middlewares::RequireJWT;
use crate::models::classroom_students::requests::{RosterListParams, RosterQuery};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_roster(
    service: &ClassroomStudentService,
    request: &HttpRequest,
    classroom_id: i64,
    params: RosterListParams,
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

    // 花名册只对班级归属教师和管理员开放
    if role != Some(UserRole::Admin) && classroom.teacher_id != uid {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassroomPermissionDenied,
            "You do not have permission to view this roster",
        )));
    }

    let query = RosterQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        search: params.search,
    };

    match storage.list_roster(classroom_id, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Roster retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list roster for {}: {}", classroom_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to list roster: {e}"),
                )),
            )
        }
    }
}
