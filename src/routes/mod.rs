//! HTTP handlers of the JSON API and the shared error mapping.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};

use crate::dto::application::ErrorBody;
use crate::services::ServiceError;

pub mod admin;
pub mod visa_application;

/// Translates a service failure into the JSON error body and status code.
/// `action` completes the log line "Failed to ...".
pub fn service_error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Unauthorized().json(ErrorBody::new("Unauthorized"))
        }
        ServiceError::Forbidden => HttpResponse::Forbidden().json(ErrorBody::new("Accès refusé")),
        ServiceError::NotFound => {
            HttpResponse::NotFound().json(ErrorBody::new("Application not found"))
        }
        ServiceError::Conflict(message) => HttpResponse::Conflict().json(ErrorBody::new(message)),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(ErrorBody::new(message))
        }
        ServiceError::Validation(errors) => HttpResponse::BadRequest().json(ErrorBody {
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }),
        ServiceError::Internal => {
            log::error!("Failed to {action}");
            HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"))
        }
    }
}

fn bad_request(detail: String) -> actix_web::Error {
    log::warn!("Rejected request body: {detail}");
    InternalError::from_response(
        detail,
        HttpResponse::BadRequest().json(ErrorBody::new("Missing required data")),
    )
    .into()
}

/// Malformed or incomplete JSON bodies answer 400 with the error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| bad_request(err.to_string()))
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err: QueryPayloadError, _req: &HttpRequest| bad_request(err.to_string()))
}
