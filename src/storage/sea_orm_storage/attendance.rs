//! 签到会话与签到记录存储操作
//!
//! 会话只有 Open / Closed 两个持久化状态，没有后台定时器：
//! 过期的 Open 会话由各写路径在动手前就地落账（状态改为 Closed，
//! closed_at 取 deadline）。读路径不落账，开放与否由调用方现算。

use super::SeaOrmStorage;
use crate::config::LedgerScope;
use crate::entity::attendance_records::{
    ActiveModel as RecordActiveModel, Column as RecordColumn, Entity as AttendanceRecords,
};
use crate::entity::attendance_sessions::{
    ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as AttendanceSessions,
};
use crate::errors::{AttendanceError, Result};
use crate::models::attendance::{
    entities::{AttendanceRecord, AttendanceSession, SessionStatus},
    responses::{AttendanceListResponse, CleanupSessionResponse},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

impl SeaOrmStorage {
    /// 把已过期但仍标记为 Open 的会话落账为 Closed
    ///
    /// closed_at 取 deadline 而不是当前时间：窗口在到点那一刻就已经
    /// 关闭了，落账只是补记。
    async fn finalize_expired_sessions(&self, classroom_id: i64, now: DateTime<Utc>) -> Result<()> {
        AttendanceSessions::update_many()
            .col_expr(
                SessionColumn::Status,
                Expr::value(SessionStatus::Closed.to_string()),
            )
            .col_expr(
                SessionColumn::ClosedAt,
                Expr::col(SessionColumn::Deadline).into(),
            )
            .filter(SessionColumn::ClassroomId.eq(classroom_id))
            .filter(SessionColumn::Status.eq(SessionStatus::Open.to_string()))
            .filter(SessionColumn::Deadline.lte(now.timestamp()))
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("会话落账失败: {e}")))?;

        Ok(())
    }

    /// 开启签到会话
    ///
    /// 同一班级同一时刻最多一个开放中的会话；已有会话开放时返回
    /// SessionConflict，由调用方映射为业务错误码。
    pub async fn start_session_impl(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<AttendanceSession> {
        self.finalize_expired_sessions(classroom_id, now).await?;

        // 落账后仍为 Open 的会话必然 deadline > now
        if let Some(open) = self.get_open_session_impl(classroom_id).await? {
            return Err(AttendanceError::session_conflict(format!(
                "班级 {classroom_id} 已有开放中的会话 {}",
                open.id
            )));
        }

        let deadline = now + duration;
        let model = SessionActiveModel {
            classroom_id: Set(classroom_id),
            session_date: Set(now.format("%Y-%m-%d").to_string()),
            status: Set(SessionStatus::Open.to_string()),
            started_at: Set(now.timestamp()),
            deadline: Set(deadline.timestamp()),
            closed_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("创建签到会话失败: {e}")))?;

        Ok(result.into_session())
    }

    /// 停止签到会话，返回最近一个会话的最终签到名单
    ///
    /// 幂等：没有会话或会话已关闭时同样成功，返回该会话（或空）的名单。
    pub async fn stop_session_impl(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.finalize_expired_sessions(classroom_id, now).await?;

        let latest = AttendanceSessions::find()
            .filter(SessionColumn::ClassroomId.eq(classroom_id))
            .order_by_desc(SessionColumn::Id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询签到会话失败: {e}")))?;

        let Some(session) = latest else {
            return Ok(Vec::new());
        };

        if session.status == SessionStatus::OPEN {
            let mut model: SessionActiveModel = session.clone().into_active_model();
            model.status = Set(SessionStatus::Closed.to_string());
            model.closed_at = Set(Some(now.timestamp()));
            model
                .update(&self.db)
                .await
                .map_err(|e| AttendanceError::database_operation(format!("关闭会话失败: {e}")))?;
        }

        self.list_records_for_session(session.id).await
    }

    /// 获取班级最近一个 Open 状态的会话
    ///
    /// 纯读路径，不落账；返回的会话可能已过了 deadline，
    /// 调用方必须用 `is_open_at(now)` 现算。
    pub async fn get_open_session_impl(
        &self,
        classroom_id: i64,
    ) -> Result<Option<AttendanceSession>> {
        let result = AttendanceSessions::find()
            .filter(SessionColumn::ClassroomId.eq(classroom_id))
            .filter(SessionColumn::Status.eq(SessionStatus::Open.to_string()))
            .order_by_desc(SessionColumn::Id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询签到会话失败: {e}")))?;

        Ok(result.map(|m| m.into_session()))
    }

    /// 班级在 `now` 时刻是否有开放中的会话
    pub async fn has_open_session_impl(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let session = self.get_open_session_impl(classroom_id).await?;
        Ok(session.map(|s| s.is_open_at(now)).unwrap_or(false))
    }

    /// 提交签到
    ///
    /// 去重依赖 (classroom_id, ledger_key, student_id) 唯一索引在插入时
    /// 原子拒绝，不做先查后插。
    pub async fn submit_attendance_impl(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        photo_token: &str,
        scope: LedgerScope,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord> {
        self.finalize_expired_sessions(classroom_id, now).await?;

        let session = self
            .get_open_session_impl(classroom_id)
            .await?
            .filter(|s| s.is_open_at(now))
            .ok_or_else(|| {
                AttendanceError::session_closed(format!("班级 {classroom_id} 当前没有开放的签到窗口"))
            })?;

        let ledger_key = match scope {
            LedgerScope::Day => session.session_date.clone(),
            LedgerScope::Session => session.id.to_string(),
        };

        let model = RecordActiveModel {
            classroom_id: Set(classroom_id),
            session_id: Set(session.id),
            ledger_key: Set(ledger_key),
            student_id: Set(student_id),
            student_name: Set(student_name.to_string()),
            photo_token: Set(photo_token.to_string()),
            submitted_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if Self::is_unique_violation(&e) {
                AttendanceError::duplicate_submission(format!(
                    "学生 {student_id} 在当前账本范围内已签到"
                ))
            } else {
                AttendanceError::database_operation(format!("写入签到记录失败: {e}"))
            }
        })?;

        Ok(result.into_record())
    }

    /// 按日期列出签到记录
    pub async fn list_attendance_impl(
        &self,
        classroom_id: i64,
        date: &str,
    ) -> Result<AttendanceListResponse> {
        let session_ids: Vec<i64> = AttendanceSessions::find()
            .filter(SessionColumn::ClassroomId.eq(classroom_id))
            .filter(SessionColumn::SessionDate.eq(date))
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询签到会话失败: {e}")))?
            .into_iter()
            .map(|s| s.id)
            .collect();

        if session_ids.is_empty() {
            return Ok(AttendanceListResponse {
                items: Vec::new(),
                total: 0,
            });
        }

        let records = AttendanceRecords::find()
            .filter(RecordColumn::SessionId.is_in(session_ids))
            .order_by_asc(RecordColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询签到记录失败: {e}")))?;

        let items: Vec<AttendanceRecord> = records.into_iter().map(|m| m.into_record()).collect();
        let total = items.len() as i64;

        Ok(AttendanceListResponse { items, total })
    }

    /// 清理班级的历史会话与签到记录
    ///
    /// 仍有开放中的会话时拒绝，先 stop 再清理。
    pub async fn cleanup_sessions_impl(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CleanupSessionResponse> {
        self.finalize_expired_sessions(classroom_id, now).await?;

        if self.get_open_session_impl(classroom_id).await?.is_some() {
            return Err(AttendanceError::session_conflict(format!(
                "班级 {classroom_id} 仍有开放中的会话，先停止再清理"
            )));
        }

        let deleted_attendance = AttendanceRecords::delete_many()
            .filter(RecordColumn::ClassroomId.eq(classroom_id))
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("清理签到记录失败: {e}")))?
            .rows_affected;

        let deleted_sessions = AttendanceSessions::delete_many()
            .filter(SessionColumn::ClassroomId.eq(classroom_id))
            .exec(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("清理签到会话失败: {e}")))?
            .rows_affected;

        Ok(CleanupSessionResponse {
            deleted_sessions: deleted_sessions as i64,
            deleted_attendance: deleted_attendance as i64,
        })
    }

    /// 某个会话的全部签到记录，按提交时间排序
    async fn list_records_for_session(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        let records = AttendanceRecords::find()
            .filter(RecordColumn::SessionId.eq(session_id))
            .order_by_asc(RecordColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询签到记录失败: {e}")))?;

        Ok(records.into_iter().map(|m| m.into_record()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classrooms::requests::CreateClassroomRequest;
    use chrono::TimeZone;

    async fn test_storage() -> SeaOrmStorage {
        let storage = SeaOrmStorage::new_with_url(":memory:")
            .await
            .expect("in-memory storage");

        // 外键约束要求教师与学生先存在
        seed_user(&storage, 1, "teacher", "teacher").await;
        seed_user(&storage, 101, "zhangsan", "student").await;
        seed_user(&storage, 102, "lisi", "student").await;
        seed_user(&storage, 103, "wangwu", "student").await;

        storage
    }

    async fn seed_user(storage: &SeaOrmStorage, id: i64, username: &str, role: &str) {
        let now = t0().timestamp();
        let model = crate::entity::users::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("hash".to_string()),
            role: Set(role.to_string()),
            status: Set("active".to_string()),
            display_name: Set(None),
            avatar_url: Set(None),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&storage.db).await.expect("seed user");
    }

    async fn test_classroom(storage: &SeaOrmStorage, code: &str) -> i64 {
        storage
            .create_classroom_impl(
                1,
                CreateClassroomRequest {
                    course_name: "操作系统".to_string(),
                    class_code: code.to_string(),
                },
            )
            .await
            .expect("create classroom")
            .id
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[tokio::test]
    async fn test_session_timeline() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "OS2025A").await;

        // T=0 开启 300 秒的窗口
        let session = storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.deadline, t0() + secs(300));

        // T=10 学生 101 签到成功
        let record = storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-101",
                LedgerScope::Day,
                t0() + secs(10),
            )
            .await
            .unwrap();
        assert_eq!(record.session_id, session.id);
        assert_eq!(record.ledger_key, "2025-06-02");

        // T=20 学生 101 重复签到被原子拒绝
        let dup = storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-101b",
                LedgerScope::Day,
                t0() + secs(20),
            )
            .await;
        assert!(matches!(dup, Err(AttendanceError::DuplicateSubmission(_))));

        // T=299 另一个学生压线签到成功
        storage
            .submit_attendance_impl(
                classroom_id,
                102,
                "李四",
                "tok-102",
                LedgerScope::Day,
                t0() + secs(299),
            )
            .await
            .unwrap();

        // T=301 窗口已过，提交被拒绝
        let late = storage
            .submit_attendance_impl(
                classroom_id,
                103,
                "王五",
                "tok-103",
                LedgerScope::Day,
                t0() + secs(301),
            )
            .await;
        assert!(matches!(late, Err(AttendanceError::SessionClosed(_))));

        // T=305 状态查询观察到已关闭
        assert!(
            !storage
                .has_open_session_impl(classroom_id, t0() + secs(305))
                .await
                .unwrap()
        );

        // 停止返回最终名单，两条记录按提交时间排序
        let entries = storage
            .stop_session_impl(classroom_id, t0() + secs(305))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].student_id, 101);
        assert_eq!(entries[1].student_id, 102);

        // 重复停止是幂等的
        let entries_again = storage
            .stop_session_impl(classroom_id, t0() + secs(400))
            .await
            .unwrap();
        assert_eq!(entries_again.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_submissions() {
        let storage = std::sync::Arc::new(test_storage().await);
        let classroom_id = test_classroom(&storage, "OS2025E").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();

        // 同一学生并发提交，唯一索引保证恰好一条成功
        let mut handles = Vec::new();
        for i in 0..8 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage
                    .submit_attendance_impl(
                        classroom_id,
                        101,
                        "张三",
                        &format!("tok-{i}"),
                        LedgerScope::Day,
                        t0() + secs(10),
                    )
                    .await
            }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(AttendanceError::DuplicateSubmission(_)) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 7);
    }

    #[tokio::test]
    async fn test_exact_deadline_is_closed() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "OS2025B").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();

        // now == deadline 即关闭
        let at_deadline = storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-101",
                LedgerScope::Day,
                t0() + secs(300),
            )
            .await;
        assert!(matches!(at_deadline, Err(AttendanceError::SessionClosed(_))));
    }

    #[tokio::test]
    async fn test_start_conflicts_while_open() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "OS2025C").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();

        let conflict = storage
            .start_session_impl(classroom_id, t0() + secs(60), secs(300))
            .await;
        assert!(matches!(conflict, Err(AttendanceError::SessionConflict(_))));

        // 另一个班级不受影响
        let other_id = test_classroom(&storage, "OS2025D").await;
        storage
            .start_session_impl(other_id, t0() + secs(60), secs(300))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_after_expiry_without_stop() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "NET2025A").await;

        let first = storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();

        // 没人调用 stop，过期后直接开新会话也成立
        let second = storage
            .start_session_impl(classroom_id, t0() + secs(301), secs(300))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        // 第一个会话被就地落账为 Closed，closed_at 取 deadline
        let entries = storage
            .stop_session_impl(classroom_id, t0() + secs(302))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_stop_without_session_is_noop() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "NET2025B").await;

        let entries = storage.stop_session_impl(classroom_id, t0()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_day_scope_dedupes_across_sessions() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "DB2025A").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();
        storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-1",
                LedgerScope::Day,
                t0() + secs(10),
            )
            .await
            .unwrap();
        storage
            .stop_session_impl(classroom_id, t0() + secs(60))
            .await
            .unwrap();

        // 同一天的第二个会话，Day 范围下已签到的学生不能再签
        storage
            .start_session_impl(classroom_id, t0() + secs(3600), secs(300))
            .await
            .unwrap();
        let dup = storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-2",
                LedgerScope::Day,
                t0() + secs(3610),
            )
            .await;
        assert!(matches!(dup, Err(AttendanceError::DuplicateSubmission(_))));
    }

    #[tokio::test]
    async fn test_session_scope_allows_new_session_submission() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "DB2025B").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();
        storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-1",
                LedgerScope::Session,
                t0() + secs(10),
            )
            .await
            .unwrap();
        storage
            .stop_session_impl(classroom_id, t0() + secs(60))
            .await
            .unwrap();

        // Session 范围下每个会话独立去重
        let second = storage
            .start_session_impl(classroom_id, t0() + secs(3600), secs(300))
            .await
            .unwrap();
        let record = storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-2",
                LedgerScope::Session,
                t0() + secs(3610),
            )
            .await
            .unwrap();
        assert_eq!(record.ledger_key, second.id.to_string());
    }

    #[tokio::test]
    async fn test_list_attendance_by_date() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "ALG2025A").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();
        storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-1",
                LedgerScope::Day,
                t0() + secs(10),
            )
            .await
            .unwrap();
        storage
            .submit_attendance_impl(
                classroom_id,
                102,
                "李四",
                "tok-2",
                LedgerScope::Day,
                t0() + secs(20),
            )
            .await
            .unwrap();

        let list = storage
            .list_attendance_impl(classroom_id, "2025-06-02")
            .await
            .unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.items[0].student_id, 101);

        let empty = storage
            .list_attendance_impl(classroom_id, "2025-06-03")
            .await
            .unwrap();
        assert_eq!(empty.total, 0);
    }

    #[tokio::test]
    async fn test_cleanup_refuses_while_open_then_deletes() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "ALG2025B").await;

        storage
            .start_session_impl(classroom_id, t0(), secs(300))
            .await
            .unwrap();
        storage
            .submit_attendance_impl(
                classroom_id,
                101,
                "张三",
                "tok-1",
                LedgerScope::Day,
                t0() + secs(10),
            )
            .await
            .unwrap();

        // 窗口还开着，拒绝清理
        let refused = storage
            .cleanup_sessions_impl(classroom_id, t0() + secs(60))
            .await;
        assert!(matches!(refused, Err(AttendanceError::SessionConflict(_))));

        storage
            .stop_session_impl(classroom_id, t0() + secs(120))
            .await
            .unwrap();

        let cleaned = storage
            .cleanup_sessions_impl(classroom_id, t0() + secs(180))
            .await
            .unwrap();
        assert_eq!(cleaned.deleted_sessions, 1);
        assert_eq!(cleaned.deleted_attendance, 1);

        let list = storage
            .list_attendance_impl(classroom_id, "2025-06-02")
            .await
            .unwrap();
        assert_eq!(list.total, 0);
    }
}
