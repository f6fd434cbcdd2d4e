use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::ClassroomService;
use crate::errors::AttendanceError;
use crate::middlewares::RequireJWT;
use crate::models::classrooms::requests::CreateClassroomRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::random_code::generate_random_code;
use crate::utils::validate::validate_class_code;

pub async fn create_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
    mut classroom_data: CreateClassroomRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uid = match RequireJWT::extract_user_id(request) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Unauthorized: missing user id",
            )));
        }
    };

    if classroom_data.course_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Course name must not be empty",
        )));
    }

    // 班级码统一大写后校验格式；留空则自动生成一个
    classroom_data.class_code = classroom_data.class_code.trim().to_uppercase();
    if classroom_data.class_code.is_empty() {
        classroom_data.class_code = generate_random_code(8);
    }
    if let Err(msg) = validate_class_code(&classroom_data.class_code) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ClassCodeInvalid, msg)));
    }

    // 创建班级，归属当前教师
    match storage.create_classroom(uid, classroom_data).await {
        Ok(classroom) => {
            info!(
                "Classroom {} ({}) created by teacher {}",
                classroom.course_name, classroom.class_code, uid
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                classroom,
                "Classroom created successfully",
            )))
        }
        Err(AttendanceError::DuplicateClassCode(msg)) => {
            info!("Classroom creation rejected: {}", msg);
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ClassCodeAlreadyExists,
                "Class code already exists",
            )))
        }
        Err(e) => {
            error!("Classroom creation failed: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomCreationFailed,
                    format!("Classroom creation failed: {e}"),
                )),
            )
        }
    }
}
