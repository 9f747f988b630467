//! Applicant endpoints under `/api/visa-application`.

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::draft::{
    CreateApplication, SaveGeneralDraft, SavePassportDraft, SaveTravelerDraft, UpdateApplication,
};
use crate::forms::fields::calendar_today;
use crate::forms::upload::UploadAttachmentForm;
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::{
    applications as applications_service, drafts as drafts_service, uploads as uploads_service,
};

#[post("/save-draft")]
pub async fn save_draft(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SaveGeneralDraft>,
) -> impl Responder {
    let today = calendar_today();
    match drafts_service::save_general_draft(repo.get_ref(), &user, form, today) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "save the general draft"),
    }
}

#[post("/save-passport-draft")]
pub async fn save_passport_draft(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SavePassportDraft>,
) -> impl Responder {
    let today = calendar_today();
    match drafts_service::save_passport_draft(repo.get_ref(), &user, form, today) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "save the passport draft"),
    }
}

#[post("/save-traveler-draft")]
pub async fn save_traveler_draft(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SaveTravelerDraft>,
) -> impl Responder {
    let today = calendar_today();
    match drafts_service::save_traveler_draft(repo.get_ref(), &user, form, today) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "save the traveler draft"),
    }
}

#[post("/create")]
pub async fn create_application(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateApplication>,
) -> impl Responder {
    let today = calendar_today();
    match applications_service::create_application(repo.get_ref(), &user, form, today) {
        Ok(reply) => HttpResponse::Created().json(reply),
        Err(err) => service_error_response(err, "create the application"),
    }
}

#[post("/upload")]
pub async fn upload_attachment(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadAttachmentForm>,
) -> impl Responder {
    match uploads_service::upload_attachment(repo.get_ref(), &user, form.into()) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "store the uploaded file"),
    }
}

#[get("/list")]
pub async fn list_applications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match applications_service::list_applications(repo.get_ref(), &user) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "list applications"),
    }
}

#[get("/{application_id}")]
pub async fn show_application(
    application_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match applications_service::get_application(repo.get_ref(), &user, &application_id) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "load the application"),
    }
}

#[put("/{application_id}")]
pub async fn update_application(
    application_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateApplication>,
) -> impl Responder {
    let today = calendar_today();
    match applications_service::update_application(
        repo.get_ref(),
        &user,
        &application_id,
        form,
        today,
    ) {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(err) => service_error_response(err, "update the application"),
    }
}
