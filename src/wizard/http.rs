//! [`DraftSync`] over the JSON API, using a blocking `reqwest` client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dto::application::{ApplicationCreated, DraftSaved, ErrorBody};
use crate::forms::draft::{
    CreateApplication, SaveGeneralDraft, SavePassportDraft, SaveTravelerDraft,
};
use crate::forms::wizard::{FileRef, FormData};
use crate::wizard::sync::{
    ApplicationDraftId, DraftPayload, DraftReceipt, DraftRequest, DraftSync, FailedUpload,
    SubmitReceipt, SubmitRequest, SyncError,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpDraftSync {
    client: Client,
    base_url: String,
}

impl HttpDraftSync {
    /// `base_url` is the server origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/visa-application/{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn post_json<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, SyncError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self.authorized(self.client.post(self.url(path)), token).json(body);
        let response = request
            .send()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        read_json(response)
    }

    fn upload(
        &self,
        application_id: &ApplicationDraftId,
        file_type: &str,
        file: &FileRef,
        token: Option<&str>,
    ) -> Result<(), SyncError> {
        let file_error = |reason: String| SyncError::File {
            file_name: file.file_name.clone(),
            reason,
        };
        let bytes = std::fs::read(&file.path).map_err(|e| file_error(e.to_string()))?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| file_error(e.to_string()))?;
        let form = multipart::Form::new()
            .text("applicationId", application_id.to_string())
            .text("fileType", file_type.to_string())
            .part("file", part);

        let request = self
            .authorized(self.client.post(self.url("upload")), token)
            .multipart(form);
        let response = request
            .send()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        read_json::<serde_json::Value>(response).map(|_| ())
    }

    /// Sends the photo and documents one by one. A file that fails does not
    /// stop the others.
    fn upload_all(
        &self,
        application_id: &ApplicationDraftId,
        form: &FormData,
        token: Option<&str>,
    ) -> Vec<FailedUpload> {
        let files = form
            .photo
            .iter()
            .map(|photo| ("photo", photo))
            .chain(form.documents.iter().map(|doc| ("document", doc)));

        let mut failed = Vec::new();
        for (file_type, file) in files {
            if let Err(e) = self.upload(application_id, file_type, file, token) {
                log::error!(
                    "Failed to upload {} for application {application_id}: {e}",
                    file.file_name
                );
                let reason = match e {
                    SyncError::File { reason, .. } => reason,
                    other => other.to_string(),
                };
                failed.push(FailedUpload {
                    file_name: file.file_name.clone(),
                    reason,
                });
            }
        }
        failed
    }
}

/// Decodes a 2xx body, or turns anything else into [`SyncError::Server`]
/// carrying the server's `message`.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| SyncError::Network(e.to_string()))?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.message);
        return Err(SyncError::from_response(status.as_u16(), message));
    }
    serde_json::from_str(&body).map_err(|e| SyncError::Decode(e.to_string()))
}

fn receipt(id: String, application_number: String) -> Result<DraftReceipt, SyncError> {
    let application_id = ApplicationDraftId::new(id)
        .ok_or_else(|| SyncError::Decode("response has no applicationId".to_string()))?;
    Ok(DraftReceipt {
        application_id,
        application_number,
    })
}

impl DraftSync for HttpDraftSync {
    fn save_draft(&self, request: &DraftRequest) -> Result<DraftReceipt, SyncError> {
        let token = request.token.as_deref();
        let application_id = request.application_id.as_ref().map(|id| id.to_string());
        let step = request.payload.step().number();
        let key = Some(request.idempotency_key);

        let saved: DraftSaved = match &request.payload {
            DraftPayload::General(info) => self.post_json(
                "save-draft",
                &SaveGeneralDraft {
                    general_info: info.clone(),
                    step,
                    visa_type_id: request.visa_type_id.clone(),
                    idempotency_key: key,
                },
                token,
            )?,
            DraftPayload::Passport(info) => self.post_json(
                "save-passport-draft",
                &SavePassportDraft {
                    passport_info: info.clone(),
                    application_id,
                    step,
                    idempotency_key: key,
                },
                token,
            )?,
            DraftPayload::Traveler(info) => self.post_json(
                "save-traveler-draft",
                &SaveTravelerDraft {
                    traveler_info: info.clone(),
                    application_id,
                    step,
                    idempotency_key: key,
                },
                token,
            )?,
        };
        receipt(saved.application_id, saved.application_number)
    }

    fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SyncError> {
        let token = request.token.as_deref();
        let form = &request.form;
        let body = CreateApplication {
            application_id: request.application_id.as_ref().map(|id| id.to_string()),
            general_info: form.general.clone(),
            passport_info: form.passport.clone(),
            traveler_info: form.traveler.clone(),
            visa_type_id: Some(form.visa_type_id.clone()).filter(|v| !v.is_empty()),
            idempotency_key: Some(request.idempotency_key),
        };
        let created: ApplicationCreated = self.post_json("create", &body, token)?;
        let DraftReceipt {
            application_id,
            application_number,
        } = receipt(created.application_id, created.application_number)?;

        let failed_uploads = self.upload_all(&application_id, form, token);
        log::info!(
            "Uploaded {} of {} file(s) for application {application_number}",
            usize::from(form.photo.is_some()) + form.documents.len() - failed_uploads.len(),
            usize::from(form.photo.is_some()) + form.documents.len()
        );

        Ok(SubmitReceipt {
            application_id,
            application_number,
            failed_uploads,
        })
    }
}
