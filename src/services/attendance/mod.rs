//! 签到服务
//!
//! start / stop / submit 这三条写路径按班级串行化：同一班级的并发
//! 请求先抢该班级的互斥锁，观察到的状态等价于某个顺序执行。
//! status 是纯读路径，不拿锁，开放与否在请求时现算。

pub mod cleanup;
pub mod export;
pub mod list;
pub mod start;
pub mod status;
pub mod stop;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::attendance::requests::{AttendanceListParams, SubmitAttendanceRequest};
use crate::models::classrooms::entities::Classroom;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
    // 每个班级一把锁，首次访问时创建，不回收
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            locks: DashMap::new(),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    /// 班级写路径互斥锁
    pub(crate) fn classroom_lock(&self, classroom_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(classroom_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 校验班级存在且当前用户是其归属教师（或管理员）
    pub(crate) async fn ensure_owner(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
    ) -> Result<Classroom, HttpResponse> {
        let storage = self.get_storage(request);
        let role = RequireJWT::extract_user_role(request);
        let uid = RequireJWT::extract_user_id(request).unwrap_or_default();

        let classroom = match storage.get_classroom_by_id(classroom_id).await {
            Ok(Some(classroom)) => classroom,
            Ok(None) => {
                return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomNotFound,
                    "Classroom not found",
                )));
            }
            Err(e) => {
                return Err(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to get classroom: {e}"),
                    )),
                );
            }
        };

        if role != Some(UserRole::Admin) && classroom.teacher_id != uid {
            return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::ClassroomPermissionDenied,
                "You do not have permission to manage this classroom",
            )));
        }

        Ok(classroom)
    }

    /// 校验班级存在且当前学生在花名册上
    pub(crate) async fn ensure_member(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Classroom, HttpResponse> {
        let storage = self.get_storage(request);

        let classroom = match storage.get_classroom_by_id(classroom_id).await {
            Ok(Some(classroom)) => classroom,
            Ok(None) => {
                return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ClassroomNotFound,
                    "Classroom not found",
                )));
            }
            Err(e) => {
                return Err(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to get classroom: {e}"),
                    )),
                );
            }
        };

        match storage.get_membership(classroom_id, student_id).await {
            Ok(Some(_)) => Ok(classroom),
            Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::ClassroomPermissionDenied,
                "You are not enrolled in this classroom",
            ))),
            Err(e) => Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to check membership: {e}"),
                )),
            ),
        }
    }

    // 开启签到会话
    pub async fn start_session(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        start::start_session(self, request, classroom_id).await
    }

    // 停止签到会话
    pub async fn stop_session(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        stop::stop_session(self, request, classroom_id).await
    }

    // 查询会话状态
    pub async fn session_status(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        status::session_status(self, request, classroom_id).await
    }

    // 学生提交签到
    pub async fn submit(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
        submit_request: SubmitAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, request, classroom_id, submit_request).await
    }

    // 签到记录列表
    pub async fn list_records(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
        params: AttendanceListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_records(self, request, classroom_id, params).await
    }

    // 导出签到记录 CSV
    pub async fn export_records(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
        params: AttendanceListParams,
    ) -> ActixResult<HttpResponse> {
        export::export_records(self, request, classroom_id, params).await
    }

    // 清理历史会话
    pub async fn cleanup_sessions(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        cleanup::cleanup_sessions(self, request, classroom_id).await
    }
}
