use guestmail_common::{Diagnostic, PropertyId, TemplateId};
use serde::Serialize;

use crate::errors::SessionError;
use crate::session::{Draft, EditingSession, SaveStatus, SessionState};

/// Everything a view needs to redraw the editor, published after every change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub property_id: PropertyId,
    pub state: SessionState,
    pub draft: Option<Draft>,
    /// Compile in progress, or finished a moment ago
    pub busy: bool,
    /// A debounced render is waiting for its timer
    pub render_pending: bool,
    #[serde(serialize_with = "error_message")]
    pub error: Option<SessionError>,
}

fn error_message<S: serde::Serializer>(
    error: &Option<SessionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &EditingSession, busy: bool, render_pending: bool) -> Self {
        Self {
            property_id: session.property().id.clone(),
            state: session.state(),
            draft: session.draft().cloned(),
            busy,
            render_pending,
            error: session.failure().cloned(),
        }
    }

    pub fn template_id(&self) -> Option<&TemplateId> {
        self.draft.as_ref().map(|d| &d.template().id)
    }

    pub fn source_text(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.source_text())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.draft.as_ref().map_or(&[], |d| d.diagnostics())
    }

    pub fn preview_html(&self) -> &str {
        self.draft.as_ref().map_or("", |d| d.preview_html())
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.as_ref().is_some_and(|d| d.is_dirty())
    }

    pub fn save_status(&self) -> SaveStatus {
        self.draft
            .as_ref()
            .map_or(SaveStatus::Idle, |d| d.save_status())
    }
}
