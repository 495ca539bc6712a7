use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::responses::RefreshTokenResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::jwt;

use super::AuthService;

// 用 HttpOnly cookie 里的 refresh token 换发新的 access token
pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    match jwt::JwtUtils::extract_refresh_token_from_cookie(request) {
        Some(refresh_token) => match jwt::JwtUtils::refresh_access_token(&refresh_token) {
            Ok(new_access_token) => {
                let response = RefreshTokenResponse {
                    access_token: new_access_token,
                    expires_in: config.jwt.access_token_expiry * 60, // 转换为秒
                };
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    response,
                    "Token refreshed successfully",
                )))
            }
            Err(e) => {
                tracing::info!("Refresh token rejected: {}", e);

                // 无效的 refresh token cookie 一并清除
                Ok(HttpResponse::Unauthorized()
                    .cookie(jwt::JwtUtils::clear_refresh_token_cookie())
                    .json(ApiResponse::error_empty(
                        ErrorCode::Unauthorized,
                        "Login expired or invalid, please login again",
                    )))
            }
        },
        None => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))),
    }
}
