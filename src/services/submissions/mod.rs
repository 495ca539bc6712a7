pub mod dashboard;
pub mod delete;
pub mod download;
pub mod list;
pub mod submit;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::PortalError;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::vault::FileVault;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_vault(&self, request: &HttpRequest) -> FileVault {
        request
            .app_data::<actix_web::web::Data<FileVault>>()
            .expect("File vault not found in app data")
            .get_ref()
            .clone()
    }

    /// 提交作业（multipart）
    pub async fn submit(
        &self,
        request: &HttpRequest,
        actor: User,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        submit::handle_submit(self, request, actor, payload).await
    }

    /// 学生面板：自己的全部提交
    pub async fn student_dashboard(
        &self,
        request: &HttpRequest,
        actor: User,
    ) -> ActixResult<HttpResponse> {
        list::handle_student_dashboard(self, request, actor).await
    }

    /// 下载提交（自己或管理员）
    pub async fn download(
        &self,
        request: &HttpRequest,
        actor: User,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, actor, submission_id).await
    }

    /// 删除提交（仅管理员）
    pub async fn delete(
        &self,
        request: &HttpRequest,
        actor: User,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete(self, request, actor, submission_id).await
    }

    /// 管理员面板：全部学生的提交概览
    pub async fn admin_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::handle_admin_dashboard(self, request).await
    }
}

/// 把工作流错误映射为统一的 JSON 响应
pub(crate) fn error_response(err: PortalError) -> HttpResponse {
    match err {
        PortalError::InvalidFileType(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::FileTypeNotAllowed, msg)),
        PortalError::PermissionDenied(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        PortalError::NotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionNotFound, msg)),
        PortalError::DuplicateSubmission(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::SubmitFailed, msg))
        }
        PortalError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        other => {
            tracing::error!("{}", other);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                other.format_simple(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_response_status_mapping() {
        // 并发首次提交的落败方拿到 409，不是 500
        let conflict = error_response(PortalError::duplicate_submission("冲突"));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        assert_eq!(
            error_response(PortalError::invalid_file_type("exe")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(PortalError::permission_denied("拒绝")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_response(PortalError::not_found("缺失")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(PortalError::storage("io")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
