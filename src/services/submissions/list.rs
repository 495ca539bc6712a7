use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::SubmissionService;
use crate::catalog::AssignmentCatalog;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::submissions::entities::Submission;
use crate::models::submissions::responses::{StudentDashboardResponse, SubmissionItem};
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 提交记录补上作业名称，按存储层给定的顺序展示
pub fn annotate(catalog: &AssignmentCatalog, submissions: Vec<Submission>) -> Vec<SubmissionItem> {
    submissions
        .into_iter()
        .map(|s| SubmissionItem {
            id: s.id,
            assignment_number: s.assignment_number,
            assignment_name: catalog.name_of(s.assignment_number),
            file_name: s.file_name,
            submitted_at: s.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect()
}

/// 学生面板数据：自己的全部提交，按作业编号升序
pub async fn student_dashboard_data(
    storage: &Arc<dyn Storage>,
    catalog: &AssignmentCatalog,
    actor: &User,
) -> Result<StudentDashboardResponse> {
    let submissions = storage.list_submissions_by_user(actor.id).await?;
    Ok(StudentDashboardResponse {
        submissions: annotate(catalog, submissions),
    })
}

pub async fn handle_student_dashboard(
    service: &SubmissionService,
    request: &HttpRequest,
    actor: User,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let catalog = AssignmentCatalog::get();

    match student_dashboard_data(&storage, catalog, &actor).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, "获取成功"))),
        Err(e) => Ok(super::error_response(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssignmentEntry;

    fn submission(n: i32, file_name: &str) -> Submission {
        Submission {
            id: n as i64,
            user_id: 1,
            assignment_number: n,
            file_path: format!("20230001/{n}_{file_name}"),
            file_name: file_name.to_string(),
            submitted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_annotate_names_and_fallback() {
        let catalog = AssignmentCatalog::from_entries(vec![AssignmentEntry {
            id: 1,
            name: "线性表".to_string(),
        }]);

        let items = annotate(&catalog, vec![submission(1, "a.pdf"), submission(7, "b.zip")]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].assignment_name, "线性表");
        // 目录之外的编号回退为默认名称
        assert_eq!(items[1].assignment_name, "第7次作业");
        assert_eq!(items[1].file_name, "b.zip");
    }
}
