use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::PortalError;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_password, validate_student_id, validate_username,
};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    mut create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 1. 表单字段校验
    if let Err(msg) = validate_username(&create_request.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UsernameInvalid, msg)));
    }
    if let Err(msg) = validate_student_id(&create_request.student_id) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::StudentIdInvalid, msg)));
    }
    if let Err(msg) = validate_email(&create_request.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::EmailInvalid, msg)));
    }
    if let Err(msg) = validate_password(&create_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordInvalid, msg)));
    }

    // 2. 查重快路径：学号在前，邮箱在后，先命中先报
    if let Err(response) = check_student_id_exists(&storage, &create_request.student_id).await {
        return Ok(response);
    }
    if let Err(response) = check_email_exists(&storage, &create_request.email).await {
        return Ok(response);
    }

    // 3. 哈希密码
    match hash_password(&create_request.password) {
        Ok(password_hash) => {
            // 将明文密码替换为哈希后的密码
            create_request.password = password_hash;

            // 4. 创建用户。唯一索引是权威的查重信号，
            // 并发注册时快路径漏掉的冲突在这里被拦下
            match storage.create_user(create_request).await {
                Ok(user) => {
                    Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功，请登录")))
                }
                Err(PortalError::DuplicateStudentId(msg)) => Ok(HttpResponse::Conflict()
                    .json(ApiResponse::error_empty(ErrorCode::StudentIdAlreadyExists, msg))),
                Err(PortalError::DuplicateEmail(msg)) => Ok(HttpResponse::Conflict()
                    .json(ApiResponse::error_empty(ErrorCode::EmailAlreadyExists, msg))),
                Err(e) => Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::RegisterFailed,
                        format!("注册失败: {e}"),
                    )),
                ),
            }
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("密码哈希失败: {e}"),
            )),
        ),
    }
}

async fn check_student_id_exists(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    student_id: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_student_id(student_id).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::StudentIdAlreadyExists,
            "Student ID already registered",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Register failed: {e}"),
            )),
        ),
    }
}

async fn check_email_exists(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    email: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::EmailAlreadyExists,
            "Email already registered",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Register failed: {e}"),
            )),
        ),
    }
}
