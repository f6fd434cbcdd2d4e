pub mod join;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classroom_students::requests::{JoinClassroomRequest, RosterListParams};
use crate::storage::Storage;

pub struct ClassroomStudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassroomStudentService {
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

    // 学生凭班级码加入班级
    pub async fn join_classroom(
        &self,
        request: &HttpRequest,
        join_request: JoinClassroomRequest,
    ) -> ActixResult<HttpResponse> {
        join::join_classroom(self, request, join_request).await
    }

    // 班级花名册
    pub async fn list_roster(
        &self,
        request: &HttpRequest,
        classroom_id: i64,
        params: RosterListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_roster(self, request, classroom_id, params).await
    }
}
