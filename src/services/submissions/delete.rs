use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::SubmissionService;
use crate::errors::{PortalError, Result};
use crate::models::ApiResponse;
use crate::models::users::entities::User;
use crate::services::policy;
use crate::storage::Storage;
use crate::vault::FileVault;

/// 删除一条提交：先尽力清理文件，再删除记录；
/// 文件缺失不阻止记录删除
pub async fn delete_submission(
    storage: &Arc<dyn Storage>,
    vault: &FileVault,
    actor: &User,
    submission_id: i64,
) -> Result<()> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("提交不存在: {submission_id}")))?;

    if !policy::can_delete(&submission, actor) {
        return Err(PortalError::permission_denied("只有管理员可以删除提交"));
    }

    vault.delete_best_effort(&submission.file_path);
    storage.delete_submission(submission.id).await?;
    tracing::info!(
        "删除提交: id={} path={} by={}",
        submission.id,
        submission.file_path,
        actor.student_id
    );
    Ok(())
}

pub async fn handle_delete(
    service: &SubmissionService,
    request: &HttpRequest,
    actor: User,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let vault = service.get_vault(request);

    match delete_submission(&storage, &vault, &actor, submission_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("提交已删除"))),
        Err(e) => Ok(super::error_response(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn temp_vault(tag: &str) -> FileVault {
        let dir = std::env::temp_dir().join(format!(
            "portal-delete-{tag}-{}-{}",
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

    #[tokio::test]
    async fn test_admin_delete_removes_blob_and_row() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("admin");

        let owner = create_user(&storage, "20230001", UserRole::Student).await;
        let admin = create_user(&storage, "00000099", UserRole::Admin).await;

        vault.save("20230001/1_hw.zip", b"bytes").unwrap();
        let submission = storage
            .create_submission(owner.id, 1, "20230001/1_hw.zip", "hw.zip")
            .await
            .unwrap();

        delete_submission(&storage, &vault, &admin, submission.id)
            .await
            .unwrap();

        assert!(!vault.exists("20230001/1_hw.zip"));
        assert!(
            storage
                .get_submission_by_id(submission.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_owner_cannot_delete() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("owner");

        let owner = create_user(&storage, "20230001", UserRole::Student).await;
        vault.save("20230001/1_hw.zip", b"bytes").unwrap();
        let submission = storage
            .create_submission(owner.id, 1, "20230001/1_hw.zip", "hw.zip")
            .await
            .unwrap();

        let err = delete_submission(&storage, &vault, &owner, submission.id)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "E006");
        // 被拒绝的删除不得触碰文件或记录
        assert!(vault.exists("20230001/1_hw.zip"));
        assert!(
            storage
                .get_submission_by_id(submission.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_delete_survives_missing_blob() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("noblob");

        let owner = create_user(&storage, "20230001", UserRole::Student).await;
        let admin = create_user(&storage, "00000099", UserRole::Admin).await;
        let submission = storage
            .create_submission(owner.id, 1, "20230001/1_gone.pdf", "gone.pdf")
            .await
            .unwrap();

        delete_submission(&storage, &vault, &admin, submission.id)
            .await
            .unwrap();
        assert!(
            storage
                .get_submission_by_id(submission.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_missing_submission() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("missing");
        let admin = create_user(&storage, "00000099", UserRole::Admin).await;

        let err = delete_submission(&storage, &vault, &admin, 424242)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
