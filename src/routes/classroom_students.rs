use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classroom_students::requests::{JoinClassroomRequest, RosterListParams};
use crate::models::users::entities::UserRole;
use crate::services::ClassroomStudentService;
use crate::utils::SafeClassroomIdI64;

// 懒加载的全局 ClassroomStudentService 实例
static CLASSROOM_STUDENT_SERVICE: Lazy<ClassroomStudentService> =
    Lazy::new(ClassroomStudentService::new_lazy);

// HTTP处理程序
pub async fn join_classroom(
    req: HttpRequest,
    join_data: web::Json<JoinClassroomRequest>,
) -> ActixResult<HttpResponse> {
    CLASSROOM_STUDENT_SERVICE
        .join_classroom(&req, join_data.into_inner())
        .await
}

pub async fn list_roster(
    req: HttpRequest,
    path: SafeClassroomIdI64,
    query: web::Query<RosterListParams>,
) -> ActixResult<HttpResponse> {
    CLASSROOM_STUDENT_SERVICE
        .list_roster(&req, path.0, query.into_inner())
        .await
}

// 配置路由
//
// 注意：/join 与花名册两个 scope 都比 /api/v1/classrooms/{classroom_id}
// 更具体，必须在班级 CRUD 路由之前注册，否则 "join" 会被当成班级 ID。
pub fn configure_classroom_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classrooms/join")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .wrap(middlewares::RateLimit::class_code())
                    .route(
                        web::post()
                            .to(join_classroom)
                            // 学生凭班级码加入班级
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/classrooms/{classroom_id}/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::get()
                        .to(list_roster)
                        // 花名册只对教师与管理员开放
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
