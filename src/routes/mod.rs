use actix_web::{HttpResponse, web};

pub mod admin;
pub mod auth;
pub mod student;

async fn index() -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header(("Location", "/login"))
        .finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    auth::configure_auth_routes(cfg);
    student::configure_student_routes(cfg);
    admin::configure_admin_routes(cfg);
}
