use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::models::{ApiResponse, ErrorCode};

// 学生在加入前凭班级码查看班级信息
pub async fn get_classroom_by_code(
    service: &ClassroomService,
    request: &HttpRequest,
    class_code: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_classroom_by_code(&class_code).await {
        Ok(Some(classroom)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(classroom, "Classroom found")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "No classroom found for this class code",
        ))),
        Err(e) => {
            error!("Failed to look up class code: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get classroom: {e}"),
                )),
            )
        }
    }
}

pub async fn get_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
    classroom_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_classroom_by_id(classroom_id).await {
        Ok(Some(classroom)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(classroom, "Classroom found")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassroomNotFound,
            "Classroom not found",
        ))),
        Err(e) => {
            error!("Failed to get classroom {}: {}", classroom_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get classroom: {e}"),
                )),
            )
        }
    }
}
