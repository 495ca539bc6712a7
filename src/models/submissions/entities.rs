use serde::{Deserialize, Serialize};

/// 提交实体：一个学生对一次作业至多一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub assignment_number: i32,
    /// 保险库内的相对路径 `{student_id}/{assignment_number}_{sanitized}`
    pub file_path: String,
    /// 上传时的原始文件名，用于下载展示
    pub file_name: String,
    /// 首次提交时间，重复提交不更新
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}
