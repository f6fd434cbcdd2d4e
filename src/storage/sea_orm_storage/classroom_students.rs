//! 花名册存储操作

use super::SeaOrmStorage;
use crate::entity::classroom_students::{ActiveModel, Column, Entity as ClassroomStudents};
use crate::errors::{AttendanceError, Result};
use crate::models::{
    PaginationInfo,
    classroom_students::{
        entities::Membership, requests::RosterQuery, responses::RosterListResponse,
    },
};
use crate::utils::escape_like_pattern;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 学生加入班级
    ///
    /// 幂等：已在班级中时直接返回现有成员关系，不报错。
    pub async fn enroll_student_impl(
        &self,
        classroom_id: i64,
        student_id: i64,
        student_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Membership> {
        if let Some(existing) = self.get_membership_impl(classroom_id, student_id).await? {
            return Ok(existing);
        }

        let model = ActiveModel {
            classroom_id: Set(classroom_id),
            student_id: Set(student_id),
            student_name: Set(student_name.to_string()),
            joined_at: Set(now.timestamp()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(result.into_membership()),
            // 并发加入时落败的一方撞上唯一索引，同样按幂等成功处理
            Err(e) if Self::is_unique_violation(&e) => self
                .get_membership_impl(classroom_id, student_id)
                .await?
                .ok_or_else(|| {
                    AttendanceError::database_operation(format!(
                        "加入班级失败: 学生 {student_id} 的成员关系写入后不可见"
                    ))
                }),
            Err(e) => Err(AttendanceError::database_operation(format!(
                "加入班级失败: {e}"
            ))),
        }
    }

    /// 获取学生在班级中的成员关系
    pub async fn get_membership_impl(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Option<Membership>> {
        let result = ClassroomStudents::find()
            .filter(Column::ClassroomId.eq(classroom_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询成员关系失败: {e}")))?;

        Ok(result.map(|m| m.into_membership()))
    }

    /// 分页列出班级花名册
    pub async fn list_roster_impl(
        &self,
        classroom_id: i64,
        query: RosterQuery,
    ) -> Result<RosterListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = ClassroomStudents::find().filter(Column::ClassroomId.eq(classroom_id));

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::StudentName.contains(&escaped));
        }

        // 按加入时间排序
        select = select.order_by_asc(Column::JoinedAt);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            AttendanceError::database_operation(format!("查询花名册总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            AttendanceError::database_operation(format!("查询花名册页数失败: {e}"))
        })?;

        let memberships = paginator.fetch_page(page - 1).await.map_err(|e| {
            AttendanceError::database_operation(format!("查询花名册列表失败: {e}"))
        })?;

        Ok(RosterListResponse {
            items: memberships
                .into_iter()
                .map(|m| m.into_membership())
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
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

    #[tokio::test]
    async fn test_enroll_is_idempotent() {
        let storage = test_storage().await;
        let classroom_id = test_classroom(&storage, "OS2025A").await;

        let first = storage
            .enroll_student_impl(classroom_id, 101, "张三", t0())
            .await
            .unwrap();
        let second = storage
            .enroll_student_impl(classroom_id, 101, "张三", t0())
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let roster = storage
            .list_roster_impl(classroom_id, RosterQuery::default())
            .await
            .unwrap();
        assert_eq!(roster.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_concurrent_enrolls_converge_on_one_membership() {
        let storage = std::sync::Arc::new(test_storage().await);
        let classroom_id = test_classroom(&storage, "OS2025B").await;

        // 同一学生并发加入，落败方撞唯一索引后仍按幂等成功返回
        let mut handles = Vec::new();
        for _ in 0..6 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage
                    .enroll_student_impl(classroom_id, 101, "张三", t0())
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().expect("enroll succeeds").id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        let roster = storage
            .list_roster_impl(classroom_id, RosterQuery::default())
            .await
            .unwrap();
        assert_eq!(roster.pagination.total, 1);
    }
}
