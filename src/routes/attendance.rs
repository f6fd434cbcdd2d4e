use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::{AttendanceListParams, SubmitAttendanceRequest};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::SafeClassroomIdI64;

// 懒加载的全局 AttendanceService 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

// HTTP处理程序
pub async fn start_session(
    req: HttpRequest,
    path: SafeClassroomIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.start_session(&req, path.0).await
}

pub async fn stop_session(req: HttpRequest, path: SafeClassroomIdI64) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.stop_session(&req, path.0).await
}

pub async fn session_status(
    req: HttpRequest,
    path: SafeClassroomIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.session_status(&req, path.0).await
}

pub async fn submit(
    req: HttpRequest,
    path: SafeClassroomIdI64,
    submit_data: web::Json<SubmitAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .submit(&req, path.0, submit_data.into_inner())
        .await
}

pub async fn list_records(
    req: HttpRequest,
    path: SafeClassroomIdI64,
    query: web::Query<AttendanceListParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_records(&req, path.0, query.into_inner())
        .await
}

pub async fn export_records(
    req: HttpRequest,
    path: SafeClassroomIdI64,
    query: web::Query<AttendanceListParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .export_records(&req, path.0, query.into_inner())
        .await
}

pub async fn cleanup_sessions(
    req: HttpRequest,
    path: SafeClassroomIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.cleanup_sessions(&req, path.0).await
}

// 配置路由
//
// 与花名册路由一样，这个 scope 比 /api/v1/classrooms/{classroom_id}
// 更具体，必须先于班级 CRUD 路由注册。
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classrooms/{classroom_id}/attendance")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/session/start").route(
                    web::post()
                        .to(start_session)
                        // 教师开启签到会话
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/session/stop").route(
                    web::post()
                        .to(stop_session)
                        // 教师停止签到会话（幂等）
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                // 轮询热路径，学生与教师都可访问
                web::resource("/session/status")
                    .wrap(middlewares::RateLimit::status_poll())
                    .route(web::get().to(session_status)),
            )
            .service(
                web::resource("/session").route(
                    web::delete()
                        .to(cleanup_sessions)
                        // 教师清理历史会话与签到记录
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/submit")
                    .wrap(middlewares::RateLimit::submit())
                    .route(
                        web::post()
                            .to(submit)
                            // 学生提交签到
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            )
            .service(
                web::resource("/records").route(
                    web::get()
                        .to(list_records)
                        // 教师查看签到名单
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/records/export").route(
                    web::get()
                        .to(export_records)
                        // 教师导出 CSV
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
