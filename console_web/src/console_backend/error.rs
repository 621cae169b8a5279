use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use catalog::error::CatalogError;
use common::error::diagnostics::DiagnosticMessage;
use pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("not found: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("bad request: {context}")]
    BadRequest { context: DiagnosticMessage },
    #[error("internal error: {context}")]
    Internal { context: DiagnosticMessage },
}

impl WebError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::NotFound { context } | Self::BadRequest { context } | Self::Internal { context } => {
                context.message()
            }
        }
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let WebError::Internal { .. } = self {
            log::error!("{self}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.message() }))
    }
}

impl From<PipelineError> for WebError {
    #[track_caller]
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound { context } => WebError::NotFound { context },
            PipelineError::EmptySeed { context } | PipelineError::DuplicateId { context } => {
                WebError::BadRequest { context }
            }
            other => WebError::internal(other.to_string()),
        }
    }
}

impl From<CatalogError> for WebError {
    #[track_caller]
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { context } => WebError::NotFound { context },
            other => WebError::internal(other.to_string()),
        }
    }
}
