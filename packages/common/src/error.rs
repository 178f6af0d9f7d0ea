use thiserror::Error;

use crate::model::{PropertyId, TemplateId};
use crate::stage::Stage;

/// Rejected user input. Reported to the initiating action; nothing changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("A template named \"{name}\" already exists in the \"{stage}\" stage for this property")]
    DuplicateName { name: String, stage: Stage },
}

/// Errors from the document store and property catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Template not found: {0}")]
    NotFound(TemplateId),

    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    #[error("Template id already in use: {0}")]
    DuplicateId(TemplateId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// True for the duplicate (name, stage) rejection
    pub fn is_duplicate_name(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(ValidationError::DuplicateName { .. })
        )
    }
}
