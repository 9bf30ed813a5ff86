//! Report form ("new issue" modal)

use super::photo::PhotoAttachment;
use crate::error::{ClientError, ClientResult, FieldErrors};
use crate::repository::IssueApi;
use http::StatusCode;
use shared::validation::{DESCRICAO_MAX_LEN, DESCRICAO_MIN_LEN, TITULO_MAX_LEN, TITULO_MIN_LEN};
use shared::{AppError, Coordinate, ErrorCode, Issue, IssueType, NewIssue};
use std::path::Path;
use validator::Validate;

/// Trimmed form values, checked with the validator derive
#[derive(Debug, Validate)]
struct IssueDraft {
    #[validate(length(
        min = TITULO_MIN_LEN,
        max = TITULO_MAX_LEN,
        message = "O título deve ter entre 5 e 150 caracteres"
    ))]
    titulo: String,
    #[validate(length(
        min = DESCRICAO_MIN_LEN,
        max = DESCRICAO_MAX_LEN,
        message = "A descrição deve ter entre 10 e 2000 caracteres"
    ))]
    descricao: String,
    #[validate(required(message = "Selecione o tipo do problema"))]
    tipo: Option<IssueType>,
}

/// User-facing message for a failed create request
pub fn submit_error_message(err: &ClientError) -> String {
    if err.code() == ErrorCode::SimilarIssueNearby {
        return "Já existe um problema semelhante reportado próximo a este local".to_string();
    }
    match err.status() {
        Some(StatusCode::CONFLICT) => {
            "Já existe um problema semelhante reportado próximo a este local".to_string()
        }
        Some(StatusCode::UNAUTHORIZED) => {
            "Você precisa estar logado para reportar um problema".to_string()
        }
        Some(StatusCode::BAD_REQUEST) => "Dados inválidos. Verifique os campos.".to_string(),
        _ => "Erro ao reportar o problema. Tente novamente.".to_string(),
    }
}

/// Form state for reporting a new issue at a fixed coordinate
#[derive(Debug, Clone)]
pub struct IssueFormModal {
    pub titulo: String,
    pub descricao: String,
    pub tipo: Option<IssueType>,
    position: Coordinate,
    photo: Option<PhotoAttachment>,
    field_errors: FieldErrors,
    submit_error: Option<String>,
    submit_error_code: Option<ErrorCode>,
    submitting: bool,
}

impl IssueFormModal {
    pub fn new(position: Coordinate) -> Self {
        Self {
            titulo: String::new(),
            descricao: String::new(),
            tipo: None,
            position,
            photo: None,
            field_errors: FieldErrors::new(),
            submit_error: None,
            submit_error_code: None,
            submitting: false,
        }
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn photo(&self) -> Option<&PhotoAttachment> {
        self.photo.as_ref()
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Unified code of the last failed submit
    pub fn submit_error_code(&self) -> Option<ErrorCode> {
        self.submit_error_code
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn attach_photo(&mut self, photo: PhotoAttachment) {
        self.photo = Some(photo);
    }

    pub async fn attach_photo_path(&mut self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let photo = PhotoAttachment::from_path(path).await?;
        self.photo = Some(photo);
        Ok(())
    }

    pub fn remove_photo(&mut self) {
        self.photo = None;
    }

    /// Run client-side validation, recording field messages
    pub fn validate(&mut self) -> Result<NewIssue, FieldErrors> {
        let draft = IssueDraft {
            titulo: self.titulo.trim().to_string(),
            descricao: self.descricao.trim().to_string(),
            tipo: self.tipo,
        };

        let mut errors = FieldErrors::new();
        if let Err(e) = draft.validate() {
            for (field, errs) in e.field_errors() {
                if let Some(message) = errs.first().and_then(|err| err.message.as_ref()) {
                    errors.insert(field.to_string(), message.to_string());
                }
            }
        }
        if draft.titulo.is_empty() {
            errors.insert("titulo", "O título é obrigatório");
        }
        if draft.descricao.is_empty() {
            errors.insert("descricao", "A descrição é obrigatória");
        }

        self.field_errors = errors.clone();
        match draft.tipo {
            Some(tipo) if errors.is_empty() => Ok(NewIssue {
                titulo: draft.titulo,
                descricao: draft.descricao,
                tipo,
                latitude: self.position.lat,
                longitude: self.position.lng,
                foto_url: None,
            }),
            _ => Err(errors),
        }
    }

    /// Validate, then create the issue
    ///
    /// Nothing is sent when validation fails. The attached photo, if any,
    /// stays local.
    pub async fn submit(&mut self, api: &dyn IssueApi) -> ClientResult<Issue> {
        self.submit_error = None;
        self.submit_error_code = None;
        let payload = self.validate().map_err(ClientError::Validation)?;
        if let Some(photo) = &self.photo {
            tracing::debug!(file = photo.file_name(), "photo kept local, not sent with report");
        }

        self.submitting = true;
        let result = api.create(&payload).await;
        self.submitting = false;

        result.inspect_err(|e| {
            tracing::warn!(error = %e, code = %e.code(), "issue report rejected");
            self.submit_error = Some(submit_error_message(e));
            self.submit_error_code = Some(e.code());
        })
    }
}
