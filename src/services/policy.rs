//! 访问控制策略
//!
//! (actor, resource) 的纯函数，不产生副作用也不抛错；
//! 调用方自行检查结果并返回 PermissionDenied。

use crate::models::submissions::entities::Submission;
use crate::models::users::entities::User;

/// 下载：管理员或提交所有者
pub fn can_download(actor: &User, submission: &Submission) -> bool {
    actor.is_admin() || actor.id == submission.user_id
}

/// 删除：仅管理员，学生不能删除任何提交
pub fn can_delete(_submission: &Submission, actor: &User) -> bool {
    actor.is_admin()
}

/// 提交作业：仅非管理员，管理员不交作业
pub fn can_submit(actor: &User) -> bool {
    !actor.is_admin()
}
