//! 系统服务
//!
//! 目前只有健康检查：返回服务状态、版本与运行时长，
//! 供部署探活与看门狗使用，不需要鉴权。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::{ApiResponse, AppStartTime, HealthResponse};

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let uptime_secs = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|start| (chrono::Utc::now() - start.start_datetime).num_seconds())
            .unwrap_or_default();

        let response = HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Service is healthy")))
    }
}
