pub mod create;
pub mod delete;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classrooms::requests::{ClassroomQueryParams, CreateClassroomRequest};
use crate::storage::Storage;

pub struct ClassroomService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassroomService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
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

    // 获取班级列表
    pub async fn list_classrooms(
        &self,
        request: &HttpRequest,
        query: ClassroomQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_classrooms(self, request, query).await
    }

    // 创建班级
    pub async fn create_classroom(
        &self,
        req: &HttpRequest,
        classroom_data: CreateClassroomRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_classroom(self, req, classroom_data).await
    }

    // 根据班级码获取班级信息
    pub async fn get_classroom_by_code(
        &self,
        req: &HttpRequest,
        class_code: String,
    ) -> ActixResult<HttpResponse> {
        get::get_classroom_by_code(self, req, class_code).await
    }

    // 根据班级 ID 获取班级信息
    pub async fn get_classroom(
        &self,
        req: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_classroom(self, req, classroom_id).await
    }

    // 根据班级 ID 删除班级
    pub async fn delete_classroom(
        &self,
        req: &HttpRequest,
        classroom_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_classroom(self, req, classroom_id).await
    }
}
