//! Error conversion glue between the layers of the server.
//!
//! The domain and form layers stay free of service error types; the
//! conversions live here so `data`-only consumers do not pull them in.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => {
                log::error!("Repository error: {other}");
                ServiceError::Internal
            }
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Fields(errors) => ServiceError::Validation(errors.to_string_map()),
            FormError::TypeConstraint(err) => ServiceError::TypeConstraint(err.to_string()),
            FormError::Validation(errors) => ServiceError::Form(errors.to_string()),
            FormError::InvalidApplicationId => {
                ServiceError::Form("Application ID is missing or invalid".to_string())
            }
            FormError::InvalidStatus => ServiceError::Form("Statut invalide".to_string()),
            FormError::MissingData => ServiceError::Form("Missing required data".to_string()),
            FormError::NotATextField(field) => {
                log::error!("Field {field} was handled as text");
                ServiceError::Internal
            }
        }
    }
}
