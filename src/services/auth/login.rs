use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

// 学号不存在和密码错误返回同一条提示，避免泄露哪个字段错了
const GENERIC_AUTH_ERROR: &str = "Student ID or password is incorrect";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 根据学号获取用户信息
    match storage.get_user_by_student_id(&login_request.student_id).await {
        Ok(Some(user)) => {
            // 2. 验证密码
            if verify_password(&login_request.password, &user.password_hash) {
                // 3. 更新最后登录时间
                let _ = storage.update_last_login(user.id).await;

                // 4. 生成令牌对，remember_me 延长 refresh token 存活期
                let refresh_days = if login_request.remember_me {
                    config.jwt.refresh_token_remember_me_expiry
                } else {
                    config.jwt.refresh_token_expiry
                };

                match jwt::JwtUtils::generate_token_pair(
                    user.id,
                    &user.role.to_string(),
                    Some(chrono::Duration::days(refresh_days)),
                ) {
                    Ok(token_pair) => {
                        tracing::info!("User {} logged in successfully", user.student_id);

                        let response = LoginResponse {
                            access_token: token_pair.access_token,
                            expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
                            user,
                            created_at: chrono::Utc::now(),
                        };

                        // 5. 创建 refresh token cookie
                        let refresh_cookie = jwt::JwtUtils::create_refresh_token_cookie(
                            &token_pair.refresh_token,
                            refresh_days,
                        );

                        Ok(HttpResponse::Ok()
                            .cookie(refresh_cookie)
                            .json(ApiResponse::success(response, "Login successful")))
                    }
                    Err(e) => {
                        tracing::error!("Failed to generate JWT token: {}", e);
                        Ok(
                            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                                ErrorCode::InternalServerError,
                                "Login failed, unable to generate token",
                            )),
                        )
                    }
                }
            } else {
                Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::AuthFailed,
                    GENERIC_AUTH_ERROR,
                )))
            }
        }
        Ok(None) => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            GENERIC_AUTH_ERROR,
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Login failed: {e}"),
            )),
        ),
    }
}
