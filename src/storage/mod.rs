use std::sync::Arc;

use crate::models::{
    submissions::entities::Submission,
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段须为已哈希值；唯一约束冲突映射为 Duplicate* 错误）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过学号获取用户信息
    async fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出全部非管理员用户
    async fn list_students(&self) -> Result<Vec<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 提交管理方法
    // 创建提交记录
    async fn create_submission(
        &self,
        user_id: i64,
        assignment_number: i32,
        file_path: &str,
        file_name: &str,
    ) -> Result<Submission>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 获取某用户某次作业的提交（至多一条）
    async fn get_submission_for_assignment(
        &self,
        user_id: i64,
        assignment_number: i32,
    ) -> Result<Option<Submission>>;
    // 覆盖提交：原地更新文件路径和显示名，submitted_at 保持首次提交时间
    async fn update_submission_file(
        &self,
        id: i64,
        file_path: &str,
        file_name: &str,
    ) -> Result<Option<Submission>>;
    // 删除提交记录
    async fn delete_submission(&self, id: i64) -> Result<bool>;
    // 列出某用户的全部提交，按作业编号升序
    async fn list_submissions_by_user(&self, user_id: i64) -> Result<Vec<Submission>>;
    // 统计提交总数
    async fn count_submissions(&self) -> Result<u64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
