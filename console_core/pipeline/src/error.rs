use common::error::diagnostics::DiagnosticMessage;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline lookup failed: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("pipeline seed is empty: {context}")]
    EmptySeed { context: DiagnosticMessage },
    #[error("duplicate id in pipeline seed: {context}")]
    DuplicateId { context: DiagnosticMessage },
    #[error("serde yaml error: {context}")]
    SerdeYaml {
        context: DiagnosticMessage,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("I/O error: {context}")]
    Io {
        context: DiagnosticMessage,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn empty_seed() -> Self {
        Self::EmptySeed {
            context: DiagnosticMessage::new("at least one pipeline is required"),
        }
    }

    #[track_caller]
    pub fn duplicate_id(message: impl Into<String>) -> Self {
        Self::DuplicateId {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: DiagnosticMessage::new(message.into()),
            source,
        }
    }
}

impl From<serde_yaml::Error> for PipelineError {
    #[track_caller]
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::SerdeYaml {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}

impl From<io::Error> for PipelineError {
    #[track_caller]
    fn from(err: io::Error) -> Self {
        PipelineError::Io {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}
