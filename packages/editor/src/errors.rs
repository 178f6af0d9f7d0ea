//! Error types for the editing session

use guestmail_common::{StoreError, TemplateId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No template is open")]
    NoDraft,

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("Template {0} belongs to another property")]
    ForeignTemplate(TemplateId),

    /// The open template disappeared from the store while saving. Terminal.
    #[error("Template {0} no longer exists; the session cannot continue")]
    Vanished(TemplateId),

    #[error("Session stopped after a fatal error: {0}")]
    Terminated(String),

    /// The store refused a save for a reason other than a missing template
    #[error("Save failed: {0}")]
    Store(StoreError),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Session driver has shut down")]
    Closed,
}
