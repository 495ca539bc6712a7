use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::SubmissionService;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .json(ApiResponse::<()>::error_empty(ErrorCode::Unauthorized, "用户未登录"))
}

pub async fn admin_dashboard(request: HttpRequest) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.admin_dashboard(&request).await
}

pub async fn admin_download(
    request: HttpRequest,
    submission_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireJWT::extract_user(&request) else {
        return Ok(unauthorized());
    };
    SUBMISSION_SERVICE
        .download(&request, actor, submission_id.into_inner())
        .await
}

// 删除走 GET，前端以链接触发
pub async fn delete_homework(
    request: HttpRequest,
    submission_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireJWT::extract_user(&request) else {
        return Ok(unauthorized());
    };
    SUBMISSION_SERVICE
        .delete(&request, actor, submission_id.into_inner())
        .await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireRole::new(&UserRole::Admin))
            .wrap(middlewares::RequireJWT)
            .route("/dashboard", web::get().to(admin_dashboard))
            .route("/download/{id}", web::get().to(admin_download))
            .route("/delete_homework/{id}", web::get().to(delete_homework)),
    );
}
