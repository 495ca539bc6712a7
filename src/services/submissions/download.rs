use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::SubmissionService;
use crate::errors::{PortalError, Result};
use crate::models::submissions::entities::Submission;
use crate::models::users::entities::User;
use crate::services::policy;
use crate::storage::Storage;
use crate::vault::FileVault;

/// 读取一条提交的文件内容，未授权访问者得到 PermissionDenied 而非 404
pub async fn fetch_submission_file(
    storage: &Arc<dyn Storage>,
    vault: &FileVault,
    actor: &User,
    submission_id: i64,
) -> Result<(Submission, Vec<u8>)> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("提交不存在: {submission_id}")))?;

    if !policy::can_download(actor, &submission) {
        return Err(PortalError::permission_denied("无权下载该提交"));
    }

    let bytes = vault.read(&submission.file_path)?;
    Ok((submission, bytes))
}

pub async fn handle_download(
    service: &SubmissionService,
    request: &HttpRequest,
    actor: User,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let vault = service.get_vault(request);

    match fetch_submission_file(&storage, &vault, &actor, submission_id).await {
        Ok((submission, bytes)) => Ok(HttpResponse::Ok()
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(submission.file_name.clone())],
            })
            .content_type("application/octet-stream")
            .body(bytes)),
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
            "portal-download-{tag}-{}-{}",
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
    async fn test_download_permissions_and_content() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("perm");

        let owner = create_user(&storage, "20230001", UserRole::Student).await;
        let other = create_user(&storage, "20230002", UserRole::Student).await;
        let admin = create_user(&storage, "00000099", UserRole::Admin).await;

        vault.save("20230001/3_report.pdf", b"content").unwrap();
        let submission = storage
            .create_submission(owner.id, 3, "20230001/3_report.pdf", "report.pdf")
            .await
            .unwrap();

        let (_, bytes) = fetch_submission_file(&storage, &vault, &owner, submission.id)
            .await
            .unwrap();
        assert_eq!(bytes, b"content");

        let (_, bytes) = fetch_submission_file(&storage, &vault, &admin, submission.id)
            .await
            .unwrap();
        assert_eq!(bytes, b"content");

        let err = fetch_submission_file(&storage, &vault, &other, submission.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_download_missing_submission() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("missing");
        let admin = create_user(&storage, "00000099", UserRole::Admin).await;

        let err = fetch_submission_file(&storage, &vault, &admin, 424242)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_download_missing_blob() {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::new_with_url("sqlite::memory:").await.unwrap(),
        );
        let vault = temp_vault("noblob");
        let owner = create_user(&storage, "20230001", UserRole::Student).await;

        // 记录存在但文件已不在保险库中
        let submission = storage
            .create_submission(owner.id, 1, "20230001/1_gone.pdf", "gone.pdf")
            .await
            .unwrap();

        let err = fetch_submission_file(&storage, &vault, &owner, submission.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
