use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

// access token 是无状态的，登出只清掉 refresh cookie
pub async fn handle_logout(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(user_id) = RequireJWT::extract_user_id(request) {
        tracing::info!("User {} logged out", user_id);
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::clear_refresh_token_cookie())
        .json(ApiResponse::success_empty("Logged out")))
}
