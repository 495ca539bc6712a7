use serde::Serialize;

/// 带作业名称的提交条目（学生面板）
#[derive(Debug, Serialize)]
pub struct SubmissionItem {
    pub id: i64,
    pub assignment_number: i32,
    pub assignment_name: String,
    pub file_name: String,
    pub submitted_at: String,
}

/// 学生面板响应
#[derive(Debug, Serialize)]
pub struct StudentDashboardResponse {
    pub submissions: Vec<SubmissionItem>,
}

/// 管理员面板内的单个学生统计
#[derive(Debug, Serialize)]
pub struct StudentStats {
    pub user_id: i64,
    pub username: String,
    pub student_id: String,
    pub email: String,
    pub submissions: Vec<SubmissionItem>,
}

/// 管理员面板响应
#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub students: Vec<StudentStats>,
    pub total_files: i64,
    /// 保险库占用，单位 MB，保留两位小数
    pub total_size_mb: f64,
}
