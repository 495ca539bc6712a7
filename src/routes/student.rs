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

pub async fn student_dashboard(request: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireJWT::extract_user(&request) else {
        return Ok(unauthorized());
    };
    SUBMISSION_SERVICE.student_dashboard(&request, actor).await
}

pub async fn submit_homework(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    let Some(actor) = RequireJWT::extract_user(&request) else {
        return Ok(unauthorized());
    };
    SUBMISSION_SERVICE.submit(&request, actor, payload).await
}

pub async fn download(
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

// 配置路由
pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/student")
            .wrap(middlewares::RequireRole::new(&UserRole::Student))
            .wrap(middlewares::RequireJWT)
            .route("/dashboard", web::get().to(student_dashboard)),
    )
    .service(
        web::scope("/homework")
            .wrap(middlewares::RequireRole::new(&UserRole::Student))
            .wrap(middlewares::RequireJWT)
            .route("/submit", web::post().to(submit_homework)),
    )
    .service(
        web::scope("/download")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::get().to(download)),
    );
}
