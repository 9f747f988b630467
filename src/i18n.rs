//! Message catalogue for validation keys and user-facing alerts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s.trim().split(['-', '_']).next().unwrap_or_default();
        match lang.to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Resolves `key` for `locale`, returning the key itself when no text is
/// known for it.
pub fn translate(key: &str, locale: Locale) -> &str {
    let texts = match locale {
        Locale::En => english(key),
        Locale::Fr => french(key),
    };
    texts.unwrap_or(key)
}

fn english(key: &str) -> Option<&'static str> {
    let text = match key {
        "validation.email_required" => "Email is required",
        "validation.email_invalid" => "Please enter a valid email address",
        "validation.email_too_long" => "Email address is too long",
        "validation.email_local_too_long" => "The part before @ is too long",
        "validation.email_consecutive_dots" => "Email cannot contain consecutive dots",
        "validation.email_dot_edges" => "Email cannot start or end with a dot",
        "validation.phone_required" => "Phone number is required",
        "validation.phone_international" => "Please select your country code",
        "validation.phone_invalid" => "Please enter a valid phone number",
        "validation.arrival_date_required" => "Arrival date is required",
        "validation.arrival_date_past" => "Arrival date cannot be in the past",
        "validation.arrival_date_future" => "Arrival date cannot be more than one year away",
        "validation.address_required" => "Address in Mauritania is required",
        "validation.address_too_long" => "Address must be at most 50 characters",
        "validation.description_required" => "Purpose description is required",
        "validation.description_min_length" => "Description must be at least 30 characters",
        "validation.description_max_length" => "Description must be at most 3000 characters",
        "validation.passport_number_required" => "Passport number is required",
        "validation.passport_number_length" => "Passport number must be at most 10 characters",
        "validation.passport_number_invalid" => "Passport number may only contain letters and digits",
        "validation.issue_date_required" => "Issue date is required",
        "validation.issue_date_future" => "Issue date cannot be in the future",
        "validation.issue_date_old" => "Issue date cannot be more than 10 years ago",
        "validation.expiry_date_required" => "Expiry date is required",
        "validation.expiry_date_past" => "Passport has expired",
        "validation.expiry_date_after_issue" => "Expiry date must be after the issue date",
        "validation.place_of_issue_required" => "Place of issue is required",
        "validation.place_of_issue_length" => "Place of issue must be at most 50 characters",
        "validation.first_name_required" => "First name is required",
        "validation.first_name_length" => "First name must be at most 50 characters",
        "validation.last_name_required" => "Last name is required",
        "validation.last_name_length" => "Last name must be at most 50 characters",
        "validation.birth_date_required" => "Date of birth is required",
        "validation.birth_date_future" => "Date of birth cannot be in the future",
        "validation.birth_date_old" => "Date of birth cannot be more than 120 years ago",
        "validation.birth_place_required" => "Place of birth is required",
        "validation.birth_place_length" => "Place of birth must be at most 50 characters",
        "validation.nationality_required" => "Nationality is required",
        "validation.gender_required" => "Gender is required",
        "validation.marital_status_required" => "Marital status is required",
        "validation.occupation_required" => "Occupation is required",
        "validation.occupation_length" => "Occupation must be at most 100 characters",
        "validation.photo_required" => "A passport photo is required",
        "validation.photo_too_large" => "Photo must be 5 MB or smaller",
        "validation.photo_type" => "Photo must be a JPEG or PNG image",
        "validation.document_too_large" => "Document must be 10 MB or smaller",
        "validation.document_type" => "Document must be a PDF, JPEG or PNG file",
        "validation.date_invalid" => "Please enter a valid date",
        "alert.application_id_missing" => "Application ID not found. Please restart the form.",
        "alert.generic_error" => "An error occurred. Please try again.",
        "alert.submitted" => "Visa application submitted successfully!",
        "alert.step_unreachable" => "Complete the previous steps first.",
        "alert.review_required" => "Applications can only be submitted from the review step.",
        "alert.already_submitted" => "This application has already been submitted.",
        _ => return None,
    };
    Some(text)
}

fn french(key: &str) -> Option<&'static str> {
    let text = match key {
        "validation.email_required" => "L'email est requis",
        "validation.email_invalid" => "Veuillez saisir une adresse email valide",
        "validation.email_too_long" => "L'adresse email est trop longue",
        "validation.email_local_too_long" => "La partie avant @ est trop longue",
        "validation.email_consecutive_dots" => {
            "L'email ne peut pas contenir de points consécutifs"
        }
        "validation.email_dot_edges" => "L'email ne peut pas commencer ou finir par un point",
        "validation.phone_required" => "Le numéro de téléphone est requis",
        "validation.phone_international" => "Veuillez sélectionner l'indicatif du pays",
        "validation.phone_invalid" => "Veuillez saisir un numéro de téléphone valide",
        "validation.arrival_date_required" => "La date d'arrivée est requise",
        "validation.arrival_date_past" => "La date d'arrivée ne peut pas être dans le passé",
        "validation.arrival_date_future" => {
            "La date d'arrivée ne peut pas dépasser un an"
        }
        "validation.address_required" => "L'adresse en Mauritanie est requise",
        "validation.address_too_long" => "L'adresse ne doit pas dépasser 50 caractères",
        "validation.description_required" => "La description du motif est requise",
        "validation.description_min_length" => {
            "La description doit contenir au moins 30 caractères"
        }
        "validation.description_max_length" => {
            "La description ne doit pas dépasser 3000 caractères"
        }
        "validation.passport_number_required" => "Le numéro de passeport est requis",
        "validation.passport_number_length" => {
            "Le numéro de passeport ne doit pas dépasser 10 caractères"
        }
        "validation.passport_number_invalid" => {
            "Le numéro de passeport ne doit contenir que des lettres et des chiffres"
        }
        "validation.issue_date_required" => "La date de délivrance est requise",
        "validation.issue_date_future" => "La date de délivrance ne peut pas être dans le futur",
        "validation.issue_date_old" => "La date de délivrance ne peut pas dépasser 10 ans",
        "validation.expiry_date_required" => "La date d'expiration est requise",
        "validation.expiry_date_past" => "Le passeport est expiré",
        "validation.expiry_date_after_issue" => {
            "La date d'expiration doit être postérieure à la date de délivrance"
        }
        "validation.place_of_issue_required" => "Le lieu de délivrance est requis",
        "validation.place_of_issue_length" => {
            "Le lieu de délivrance ne doit pas dépasser 50 caractères"
        }
        "validation.first_name_required" => "Le prénom est requis",
        "validation.first_name_length" => "Le prénom ne doit pas dépasser 50 caractères",
        "validation.last_name_required" => "Le nom est requis",
        "validation.last_name_length" => "Le nom ne doit pas dépasser 50 caractères",
        "validation.birth_date_required" => "La date de naissance est requise",
        "validation.birth_date_future" => "La date de naissance ne peut pas être dans le futur",
        "validation.birth_date_old" => "La date de naissance ne peut pas dépasser 120 ans",
        "validation.birth_place_required" => "Le lieu de naissance est requis",
        "validation.birth_place_length" => {
            "Le lieu de naissance ne doit pas dépasser 50 caractères"
        }
        "validation.nationality_required" => "La nationalité est requise",
        "validation.gender_required" => "Le genre est requis",
        "validation.marital_status_required" => "La situation familiale est requise",
        "validation.occupation_required" => "La profession est requise",
        "validation.occupation_length" => "La profession ne doit pas dépasser 100 caractères",
        "validation.photo_required" => "Une photo d'identité est requise",
        "validation.photo_too_large" => "La photo ne doit pas dépasser 5 Mo",
        "validation.photo_type" => "La photo doit être au format JPEG ou PNG",
        "validation.document_too_large" => "Le document ne doit pas dépasser 10 Mo",
        "validation.document_type" => "Le document doit être au format PDF, JPEG ou PNG",
        "validation.date_invalid" => "Veuillez saisir une date valide",
        "alert.application_id_missing" => {
            "ID de demande introuvable. Veuillez recommencer le formulaire."
        }
        "alert.generic_error" => "Une erreur est survenue. Veuillez réessayer.",
        "alert.submitted" => "Demande de visa soumise avec succès !",
        "alert.step_unreachable" => "Veuillez d'abord compléter les étapes précédentes.",
        "alert.review_required" => {
            "La demande ne peut être soumise que depuis l'étape de vérification."
        }
        "alert.already_submitted" => "Cette demande a déjà été soumise.",
        _ => return None,
    };
    Some(text)
}
