use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::users::{
    entities::{User, UserRole},
    requests::CreateUserRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

/// 唯一约束冲突是重复注册的权威信号，应用层查重只是快路径。
/// 从冲突信息里区分学号和邮箱两种情况。
fn map_unique_violation(err: DbErr) -> PortalError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        if detail.contains("student_id") {
            return PortalError::duplicate_student_id("学号已注册");
        }
        if detail.contains("email") {
            return PortalError::duplicate_email("邮箱已注册");
        }
    }
    PortalError::database_operation(format!("创建用户失败: {err}"))
}

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            student_id: Set(req.student_id),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(map_unique_violation)?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过学号获取用户
    pub async fn get_user_by_student_id_impl(&self, student_id: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 列出全部非管理员用户，按学号升序
    pub async fn list_students_impl(&self) -> Result<Vec<User>> {
        let results = Users::find()
            .filter(Column::Role.ne(UserRole::Admin.to_string()))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}
