use super::entities::UserRole;
use serde::Deserialize;

// 用户创建请求（注册表单 / 管理员种子）
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub student_id: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Student
}
