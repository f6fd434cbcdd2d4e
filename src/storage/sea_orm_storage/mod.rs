//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendance;
mod classroom_students;
mod classrooms;
mod files;
mod users;

use crate::config::AppConfig;
use crate::errors::{AttendanceError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 按给定 URL 直接建库，测试与嵌入场景用
    ///
    /// 内存库强制单连接：连接池里的每个 `:memory:` 连接都是独立的数据库。
    pub async fn new_with_url(url: &str) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;
        let pool_size = if db_url.contains(":memory:") { 1 } else { 5 };
        let db = Self::connect_sqlite(&db_url, pool_size, 5).await?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AttendanceError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AttendanceError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 数据库唯一约束冲突的统一判定（SQLite / PostgreSQL / MySQL）
    pub(crate) fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
        let msg = err.to_string();
        msg.contains("UNIQUE constraint failed")
            || msg.contains("Duplicate entry")
            || msg.contains("duplicate key")
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 文件模块
    async fn upload_file(
        &self,
        upload_token: &str,
        file_name: &str,
        file_size: &i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        self.upload_file_impl(upload_token, file_name, file_size, file_type, user_id)
            .await
    }

    async fn get_file_by_token(&self, upload_token: &str) -> Result<Option<File>> {
        self.get_file_by_token_impl(upload_token).await
    }

    // 班级模块
    async fn create_classroom(
        &self,
        teacher_id: i64,
        classroom: CreateClassroomRequest,
    ) -> Result<Classroom> {
        self.create_classroom_impl(teacher_id, classroom).await
    }

    async fn get_classroom_by_id(&self, classroom_id: i64) -> Result<Option<Classroom>> {
        self.get_classroom_by_id_impl(classroom_id).await
    }

    async fn get_classroom_by_code(&self, class_code: &str) -> Result<Option<Classroom>> {
        self.get_classroom_by_code_impl(class_code).await
    }

    async fn list_classrooms_with_pagination(
        &self,
        query: ClassroomListQuery,
    ) -> Result<ClassroomListResponse> {
        self.list_classrooms_with_pagination_impl(query).await
    }

    async fn delete_classroom(&self, classroom_id: i64) -> Result<bool> {
        self.delete_classroom_impl(classroom_id).await
    }

    // 花名册模块
    async fn enroll_student(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Membership> {
        self.enroll_student_impl(classroom_id, student_id, student_name, now)
            .await
    }

    async fn get_membership(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Option<Membership>> {
        self.get_membership_impl(classroom_id, student_id).await
    }

    async fn list_roster(
        &self,
        classroom_id: i64,
        query: RosterQuery,
    ) -> Result<RosterListResponse> {
        self.list_roster_impl(classroom_id, query).await
    }

    // 签到模块
    async fn start_session(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
        duration: chrono::Duration,
    ) -> Result<AttendanceSession> {
        self.start_session_impl(classroom_id, now, duration).await
    }

    async fn stop_session(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.stop_session_impl(classroom_id, now).await
    }

    async fn get_open_session(&self, classroom_id: i64) -> Result<Option<AttendanceSession>> {
        self.get_open_session_impl(classroom_id).await
    }

    async fn has_open_session(&self, classroom_id: i64, now: DateTime<Utc>) -> Result<bool> {
        self.has_open_session_impl(classroom_id, now).await
    }

    async fn submit_attendance(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        photo_token: &str,
        scope: LedgerScope,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord> {
        self.submit_attendance_impl(classroom_id, student_id, student_name, photo_token, scope, now)
            .await
    }

    async fn list_attendance(
        &self,
        classroom_id: i64,
        date: &str,
    ) -> Result<AttendanceListResponse> {
        self.list_attendance_impl(classroom_id, date).await
    }

    async fn cleanup_sessions(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CleanupSessionResponse> {
        self.cleanup_sessions_impl(classroom_id, now).await
    }
}
