use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::LedgerScope;
use crate::models::{
    attendance::{
        entities::{AttendanceRecord, AttendanceSession},
        responses::{AttendanceListResponse, CleanupSessionResponse},
    },
    classroom_students::{
        entities::Membership, requests::RosterQuery, responses::RosterListResponse,
    },
    classrooms::{
        entities::Classroom,
        requests::{ClassroomListQuery, CreateClassroomRequest},
        responses::ClassroomListResponse,
    },
    files::entities::File,
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 统一存储接口
///
/// 签到相关的方法都显式接收 `now`：窗口是否开放一律由调用时刻现算，
/// 存储层不持有时钟，测试时可以注入任意时间点。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量（启动时判断是否需要种子管理员）
    async fn count_users(&self) -> Result<u64>;

    /// 文件管理方法
    // 记录上传的照片
    async fn upload_file(
        &self,
        upload_token: &str,
        file_name: &str,
        file_size: &i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File>;
    // 通过唯一 token 获取文件信息
    async fn get_file_by_token(&self, upload_token: &str) -> Result<Option<File>>;

    /// 班级管理方法
    // 创建班级（班级码全局唯一，冲突返回 DuplicateClassCode）
    async fn create_classroom(
        &self,
        teacher_id: i64,
        classroom: CreateClassroomRequest,
    ) -> Result<Classroom>;
    // 通过ID获取班级信息
    async fn get_classroom_by_id(&self, classroom_id: i64) -> Result<Option<Classroom>>;
    // 通过班级码获取班级信息（大小写不敏感）
    async fn get_classroom_by_code(&self, class_code: &str) -> Result<Option<Classroom>>;
    // 列出班级
    async fn list_classrooms_with_pagination(
        &self,
        query: ClassroomListQuery,
    ) -> Result<ClassroomListResponse>;
    // 删除班级（级联删除会话与签到记录）
    async fn delete_classroom(&self, classroom_id: i64) -> Result<bool>;

    /// 花名册管理方法
    // 学生加入班级；重复加入是幂等的，返回已有的成员关系
    async fn enroll_student(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Membership>;
    // 获取学生在班级中的成员关系
    async fn get_membership(&self, classroom_id: i64, student_id: i64)
    -> Result<Option<Membership>>;
    // 分页列出班级花名册
    async fn list_roster(&self, classroom_id: i64, query: RosterQuery)
    -> Result<RosterListResponse>;

    /// 签到会话管理方法
    // 开启签到会话；该班级已有开放中的会话时返回 SessionConflict
    async fn start_session(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<AttendanceSession>;
    // 停止签到会话并返回最终签到名单；没有开放中的会话时也成功（幂等）
    async fn stop_session(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>>;
    // 获取班级最近一个 Open 状态的会话（不判断是否过期，调用方现算）
    async fn get_open_session(&self, classroom_id: i64) -> Result<Option<AttendanceSession>>;
    // 班级在 `now` 时刻是否有开放中的会话
    async fn has_open_session(&self, classroom_id: i64, now: DateTime<Utc>) -> Result<bool>;
    // 提交签到；窗口关闭返回 SessionClosed，重复提交返回 DuplicateSubmission
    #[allow(clippy::too_many_arguments)]
    async fn submit_attendance(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        photo_token: &str,
        scope: LedgerScope,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord>;
    // 按日期列出签到记录（date 形如 YYYY-MM-DD）
    async fn list_attendance(
        &self,
        classroom_id: i64,
        date: &str,
    ) -> Result<AttendanceListResponse>;
    // 清理班级的历史会话与签到记录；仍有开放中的会话时拒绝
    async fn cleanup_sessions(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CleanupSessionResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
