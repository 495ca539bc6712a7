//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{PortalError, Result};
use crate::models::submissions::entities::Submission;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

fn map_insert_error(err: DbErr) -> PortalError {
    // (user_id, assignment_number) 唯一索引兜底 check-then-act 竞态：
    // 两个并发首次提交只有一个 INSERT 成功，落败方拿到可恢复的冲突而不是第二行
    if err.sql_err().is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_))) {
        return PortalError::duplicate_submission("该作业已有提交记录，请重新提交以覆盖");
    }
    PortalError::database_operation(format!("创建提交失败: {err}"))
}

impl SeaOrmStorage {
    /// 创建提交记录
    pub async fn create_submission_impl(
        &self,
        user_id: i64,
        assignment_number: i32,
        file_path: &str,
        file_name: &str,
    ) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(user_id),
            assignment_number: Set(assignment_number),
            file_path: Set(file_path.to_string()),
            file_name: Set(file_name.to_string()),
            submitted_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(map_insert_error)?;

        Ok(result.into_submission())
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取某用户某次作业的提交
    pub async fn get_submission_for_assignment_impl(
        &self,
        user_id: i64,
        assignment_number: i32,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::AssignmentNumber.eq(assignment_number))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 覆盖提交：更新文件路径和显示名。
    /// submitted_at 保持首次提交时间不变（沿用源系统行为，见 DESIGN.md）。
    pub async fn update_submission_file_impl(
        &self,
        id: i64,
        file_path: &str,
        file_name: &str,
    ) -> Result<Option<Submission>> {
        let existing = self.get_submission_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            file_path: Set(file_path.to_string()),
            file_name: Set(file_name.to_string()),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新提交失败: {e}")))?;

        self.get_submission_by_id_impl(id).await
    }

    /// 删除提交记录
    pub async fn delete_submission_impl(&self, id: i64) -> Result<bool> {
        let result = Submissions::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除提交失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出某用户的全部提交，按作业编号升序
    pub async fn list_submissions_by_user_impl(&self, user_id: i64) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::AssignmentNumber)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 统计提交总数
    pub async fn count_submissions_impl(&self) -> Result<u64> {
        let count = Submissions::find()
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("统计提交数量失败: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::Storage;

    async fn memory_storage() -> SeaOrmStorage {
        SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap()
    }

    fn student_req(student_id: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: "测试学生".to_string(),
            student_id: student_id.to_string(),
            email: email.to_string(),
            password: "$argon2id$fake$hash".to_string(),
            role: UserRole::Student,
        }
    }

    #[tokio::test]
    async fn test_duplicate_student_id_rejected() {
        let storage = memory_storage().await;
        storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();

        let err = storage
            .create_user(student_req("20230001", "b@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E002");

        // 没有第二行产生
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = memory_storage().await;
        storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();

        let err = storage
            .create_user(student_req("20230002", "a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_submission_per_assignment() {
        let storage = memory_storage().await;
        let user = storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();

        storage
            .create_submission(user.id, 3, "20230001/3_report.pdf", "report.pdf")
            .await
            .unwrap();

        // 同一 (user, assignment) 的第二次 INSERT 撞唯一索引，映射为冲突而非内部错误。
        // 并发重复提交的覆盖窗口本身不加锁，last-writer-wins（见 DESIGN.md）。
        let err = storage
            .create_submission(user.id, 3, "20230001/3_other.pdf", "other.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E014");
        assert_eq!(storage.count_submissions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_preserves_submitted_at() {
        let storage = memory_storage().await;
        let user = storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();

        let first = storage
            .create_submission(user.id, 3, "20230001/3_report.pdf", "report.pdf")
            .await
            .unwrap();

        let updated = storage
            .update_submission_file(first.id, "20230001/3_report2.pdf", "report2.pdf")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.file_name, "report2.pdf");
        assert_eq!(updated.file_path, "20230001/3_report2.pdf");
        // 覆盖提交保留首次提交时间
        assert_eq!(updated.submitted_at, first.submitted_at);
        assert_eq!(storage.count_submissions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_submission() {
        let storage = memory_storage().await;
        let user = storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();
        let sub = storage
            .create_submission(user.id, 1, "20230001/1_a.md", "a.md")
            .await
            .unwrap();

        assert!(storage.delete_submission(sub.id).await.unwrap());
        assert!(!storage.delete_submission(sub.id).await.unwrap());
        assert!(
            storage
                .get_submission_by_id(sub.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_ordered_by_assignment_number() {
        let storage = memory_storage().await;
        let user = storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();

        for n in [5, 1, 3] {
            storage
                .create_submission(user.id, n, &format!("20230001/{n}_a.md"), "a.md")
                .await
                .unwrap();
        }

        let listed = storage.list_submissions_by_user(user.id).await.unwrap();
        let numbers: Vec<i32> = listed.iter().map(|s| s.assignment_number).collect();
        assert_eq!(numbers, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn test_list_students_excludes_admin() {
        let storage = memory_storage().await;
        storage
            .create_user(student_req("20230001", "a@example.com"))
            .await
            .unwrap();
        let mut admin = student_req("00000000", "admin@localhost");
        admin.role = UserRole::Admin;
        storage.create_user(admin).await.unwrap();

        let students = storage.list_students().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].student_id, "20230001");
    }
}
