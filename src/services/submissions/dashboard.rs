use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::SubmissionService;
use crate::catalog::AssignmentCatalog;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::submissions::responses::{AdminDashboardResponse, StudentStats};
use crate::storage::Storage;
use crate::vault::FileVault;

/// 字节数转 MB，保留两位小数
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// 管理员面板数据：按学号排序的学生列表、提交总数和保险库占用
pub async fn admin_dashboard_data(
    storage: &Arc<dyn Storage>,
    vault: &FileVault,
    catalog: &AssignmentCatalog,
) -> Result<AdminDashboardResponse> {
    let mut students = Vec::new();
    for user in storage.list_students().await? {
        let submissions = storage.list_submissions_by_user(user.id).await?;
        students.push(StudentStats {
            user_id: user.id,
            username: user.username,
            student_id: user.student_id,
            email: user.email,
            submissions: super::list::annotate(catalog, submissions),
        });
    }

    let total_files = storage.count_submissions().await? as i64;
    let total_size_mb = bytes_to_mb(vault.total_bytes()?);

    Ok(AdminDashboardResponse {
        students,
        total_files,
        total_size_mb,
    })
}

pub async fn handle_admin_dashboard(
    service: &SubmissionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let vault = service.get_vault(request);
    let catalog = AssignmentCatalog::get();

    match admin_dashboard_data(&storage, &vault, catalog).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, "获取成功"))),
        Err(e) => Ok(super::error_response(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssignmentEntry;
    use crate::models::users::entities::{User, UserRole};
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn temp_vault(tag: &str) -> FileVault {
        let dir = std::env::temp_dir().join(format!(
            "portal-dashboard-{tag}-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        FileVault::new(dir).unwrap()
    }

    async fn create_user(storage: &Arc<dyn Storage>, student_id: &str, role: UserRole) -> User {
        storage
            .create_user(CreateUserRequest {
                username: format!("user-{student_id}"),
                student_id: student_id.to_string(),
                email: format!("{student_id}@example.com"),
                password: "hashed".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_bytes_to_mb_rounding() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(1024 * 1024 + 512 * 1024), 1.5);
        // 1 字节不足 0.005 MB，四舍五入到 0
        assert_eq!(bytes_to_mb(1), 0.0);
    }

    #[tokio::test]
    async fn test_admin_dashboard_aggregates() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("agg");
        let catalog = AssignmentCatalog::from_entries(vec![AssignmentEntry {
            id: 1,
            name: "线性表".to_string(),
        }]);

        let alice = create_user(&storage, "20230001", UserRole::Student).await;
        let bob = create_user(&storage, "20230002", UserRole::Student).await;
        create_user(&storage, "00000099", UserRole::Admin).await;

        vault.save("20230001/1_a.pdf", &[0u8; 1024]).unwrap();
        vault.save("20230002/2_b.zip", &[0u8; 2048]).unwrap();
        storage
            .create_submission(alice.id, 1, "20230001/1_a.pdf", "a.pdf")
            .await
            .unwrap();
        storage
            .create_submission(bob.id, 2, "20230002/2_b.zip", "b.zip")
            .await
            .unwrap();

        let data = admin_dashboard_data(&storage, &vault, &catalog)
            .await
            .unwrap();

        // 管理员账号不出现在学生列表中
        assert_eq!(data.students.len(), 2);
        assert_eq!(data.students[0].student_id, "20230001");
        assert_eq!(data.students[0].submissions[0].assignment_name, "线性表");
        assert_eq!(data.students[1].submissions[0].assignment_name, "第2次作业");
        assert_eq!(data.total_files, 2);
        assert_eq!(data.total_size_mb, bytes_to_mb(3072));
    }

    #[tokio::test]
    async fn test_admin_dashboard_empty() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("empty");
        let catalog = AssignmentCatalog::from_entries(Vec::new());

        let data = admin_dashboard_data(&storage, &vault, &catalog)
            .await
            .unwrap();
        assert!(data.students.is_empty());
        assert_eq!(data.total_files, 0);
        assert_eq!(data.total_size_mb, 0.0);
    }
}
