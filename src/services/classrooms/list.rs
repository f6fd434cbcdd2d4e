use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::middlewares::RequireJWT;
use crate::models::classrooms::requests::{ClassroomListQuery, ClassroomQueryParams};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_classrooms(
    service: &ClassroomService,
    request: &HttpRequest,
    query: ClassroomQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let role = RequireJWT::extract_user_role(request);
    let uid = RequireJWT::extract_user_id(request);

    // 教师只能看到自己的班级，管理员可以看到全部
    let teacher_id = match role {
        Some(UserRole::Admin) => None,
        _ => uid,
    };

    let list_query = ClassroomListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        teacher_id,
        search: query.search,
    };

    match storage.list_classrooms_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Classrooms retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list classrooms: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to list classrooms: {e}"),
                )),
            )
        }
    }
}
