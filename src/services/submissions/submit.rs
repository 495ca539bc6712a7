use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::path::Path;
use std::sync::Arc;

use super::SubmissionService;
use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use crate::models::submissions::entities::Submission;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::policy;
use crate::storage::Storage;
use crate::vault::FileVault;

/// 扩展名校验，不区分大小写；无扩展名视为不允许
pub fn extension_allowed(file_name: &str, allowed_types: &[String]) -> bool {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension {
        Some(ext) => allowed_types.iter().any(|t| t.to_lowercase() == ext),
        None => false,
    }
}

/// 提交作业的核心流程，先落盘后写库；
/// 覆盖提交时先尽力删除旧文件再写新文件，记录原地更新
pub async fn submit_homework(
    storage: &Arc<dyn Storage>,
    vault: &FileVault,
    actor: &User,
    assignment_number: i32,
    original_name: &str,
    bytes: &[u8],
    allowed_types: &[String],
) -> Result<Submission> {
    // 文件类型先于身份检查
    if !extension_allowed(original_name, allowed_types) {
        return Err(PortalError::invalid_file_type(format!(
            "不支持的文件类型: {original_name:?}"
        )));
    }
    if !policy::can_submit(actor) {
        return Err(PortalError::permission_denied("管理员账号不能提交作业"));
    }

    // 路径先于任何写操作确定，校验失败时保险库保持原样
    let relative = vault.resolve_path(&actor.student_id, assignment_number, original_name)?;

    let existing = storage
        .get_submission_for_assignment(actor.id, assignment_number)
        .await?;

    match existing {
        Some(previous) => {
            // 旧文件名可能与新文件名不同，先清理旧 blob
            if previous.file_path != relative {
                vault.delete_best_effort(&previous.file_path);
            }
            vault.save(&relative, bytes)?;
            let updated = storage
                .update_submission_file(previous.id, &relative, original_name)
                .await?
                .ok_or_else(|| {
                    PortalError::database_operation("覆盖提交时记录已不存在")
                })?;
            tracing::info!(
                "覆盖提交: user={} assignment={} path={}",
                actor.student_id,
                assignment_number,
                relative
            );
            Ok(updated)
        }
        None => {
            vault.save(&relative, bytes)?;
            match storage
                .create_submission(actor.id, assignment_number, &relative, original_name)
                .await
            {
                Ok(created) => {
                    tracing::info!(
                        "新提交: user={} assignment={} path={}",
                        actor.student_id,
                        assignment_number,
                        relative
                    );
                    Ok(created)
                }
                Err(e) => {
                    // 数据库拒绝时不留下孤儿文件
                    vault.delete_best_effort(&relative);
                    Err(e)
                }
            }
        }
    }
}

pub async fn handle_submit(
    service: &SubmissionService,
    request: &HttpRequest,
    actor: User,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();
    let max_size = config.upload.max_size;
    let allowed_types = &config.upload.allowed_types;

    let mut assignment_number: Option<i32> = None;
    let mut original_name = String::new();
    let mut file_bytes: Vec<u8> = Vec::new();
    let mut file_uploaded = false;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "assignment_number" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    raw.extend_from_slice(&chunk?);
                }
                let text = String::from_utf8_lossy(&raw);
                match text.trim().parse::<i32>() {
                    Ok(n) if n > 0 => assignment_number = Some(n),
                    _ => {
                        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                            ErrorCode::BadRequest,
                            format!("作业编号不合法: {text:?}"),
                        )));
                    }
                }
            }
            "file" => {
                if file_uploaded {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::MultifileUploadNotAllowed,
                        "Only one file can be uploaded at a time",
                    )));
                }
                file_uploaded = true;

                original_name = content_disposition
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                // 扩展名先行校验，类型不对时不读取剩余内容
                if !extension_allowed(&original_name, allowed_types) {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::FileTypeNotAllowed,
                        "File type not allowed",
                    )));
                }

                while let Some(chunk) = field.next().await {
                    let data = chunk?;
                    if file_bytes.len() + data.len() > max_size {
                        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                            ErrorCode::FileSizeExceeded,
                            "File size exceeds the limit",
                        )));
                    }
                    file_bytes.extend_from_slice(&data);
                }
            }
            _ => {}
        }
    }

    if !file_uploaded {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    }
    let assignment_number = match assignment_number {
        Some(n) => n,
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Missing assignment_number field",
            )));
        }
    };

    let storage = service.get_storage(request);
    let vault = service.get_vault(request);

    match submit_homework(
        &storage,
        &vault,
        &actor,
        assignment_number,
        &original_name,
        &file_bytes,
        allowed_types,
    )
    .await
    {
        Ok(submission) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "作业提交成功")))
        }
        Err(e) => Ok(super::error_response(e)),
    }
}
