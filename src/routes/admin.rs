//! Admin dashboard endpoints under `/api/admin`.

use actix_web::{HttpResponse, Responder, get, put, web};
use chrono::Utc;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::admin::{ApplicationsQuery, UpdateStatusForm};
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::admin as admin_service;

#[get("/applications")]
pub async fn admin_applications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<ApplicationsQuery>,
) -> impl Responder {
    match admin_service::list_applications(repo.get_ref(), &user, query) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list applications for the dashboard"),
    }
}

#[get("/stats")]
pub async fn admin_stats(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    match admin_service::stats(repo.get_ref(), &user, Utc::now().naive_utc()) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => service_error_response(err, "compute dashboard statistics"),
    }
}

#[put("/update-status")]
pub async fn update_status(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateStatusForm>,
) -> impl Responder {
    match admin_service::update_status(repo.get_ref(), &user, form) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "update the application status"),
    }
}
