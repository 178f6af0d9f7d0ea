//! # Editing Session
//!
//! State machine for the one template open in the editor.
//!
//! ```text
//!            open                edit              save
//!   Empty ─────────▶ Clean ◀───────────▶ Dirty ───────────▶ Saving
//!                      ▲                   ▲                   │
//!                      │ revert timer      │ edit              ▼
//!                      └──────────────── Saved ◀───────────────┘
//!
//!   Saving ── NotFound ──▶ Failed (terminal)
//! ```
//!
//! Nothing in here sleeps or spawns. Callers get a [`RenderTicket`] or
//! [`SaveToken`] back and must present it again when the matching timer
//! fires; anything issued before the latest open or edit is rejected.

use guestmail_common::{
    CompileResult, Diagnostic, Property, StoreError, Template, TemplateId,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::errors::SessionError;

/// Identifies the draft state a scheduled compile was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RenderTicket {
    /// Bumped every time a template is opened or the draft is closed
    pub generation: u64,
    /// Bumped on every edit within one generation
    pub revision: u64,
}

/// Identifies one save, so a stale auto-revert can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SaveToken(pub u64);

/// Save indicator shown next to the save button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

/// Overall session state, derived from the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Empty,
    Clean,
    Dirty,
    Saving,
    Saved,
    Failed,
}

/// Edit buffer shadowing the open template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    template: Template,
    source_text: String,
    dirty: bool,
    diagnostics: Vec<Diagnostic>,
    save_status: SaveStatus,
    preview_html: String,
    revision: u64,
}

impl Draft {
    fn new(template: Template) -> Self {
        Self {
            source_text: template.source.clone(),
            template,
            dirty: false,
            diagnostics: Vec::new(),
            save_status: SaveStatus::Idle,
            preview_html: String::new(),
            revision: 0,
        }
    }

    /// The template as last opened or saved
    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    /// Html from the last compile that produced no diagnostics
    pub fn preview_html(&self) -> &str {
        &self.preview_html
    }
}

/// What the caller must write to the store to complete a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub template_id: TemplateId,
    pub source: String,
    pub token: SaveToken,
}

#[derive(Debug)]
pub struct EditingSession {
    property: Property,
    draft: Option<Draft>,
    generation: u64,
    save_seq: u64,
    failure: Option<SessionError>,
}

impl EditingSession {
    pub fn new(property: Property) -> Self {
        Self {
            property,
            draft: None,
            generation: 0,
            save_seq: 0,
            failure: None,
        }
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        if self.failure.is_some() {
            return SessionState::Failed;
        }
        match &self.draft {
            None => SessionState::Empty,
            Some(draft) => match draft.save_status {
                SaveStatus::Saving => SessionState::Saving,
                SaveStatus::Saved => SessionState::Saved,
                SaveStatus::Idle if draft.dirty => SessionState::Dirty,
                SaveStatus::Idle => SessionState::Clean,
            },
        }
    }

    /// Replace the draft with a fresh one for `template`, discarding any
    /// unsaved edits. The returned ticket is for the initial render.
    pub fn open_template(&mut self, template: Template) -> Result<RenderTicket, SessionError> {
        self.ensure_alive()?;
        if template.owner_id != self.property.id {
            return Err(SessionError::ForeignTemplate(template.id));
        }

        if let Some(previous) = &self.draft {
            if previous.dirty {
                debug!(template_id = %previous.template.id, "Discarding unsaved edits");
            }
        }

        self.generation += 1;
        info!(template_id = %template.id, generation = self.generation, "Opened template");
        self.draft = Some(Draft::new(template));

        Ok(RenderTicket {
            generation: self.generation,
            revision: 0,
        })
    }

    /// Replace the draft text. Cancels a pending "saved" indicator.
    pub fn edit_source(&mut self, text: impl Into<String>) -> Result<RenderTicket, SessionError> {
        self.ensure_alive()?;
        let draft = self.draft.as_mut().ok_or(SessionError::NoDraft)?;

        draft.source_text = text.into();
        draft.dirty = true;
        draft.revision += 1;
        if draft.save_status == SaveStatus::Saved {
            draft.save_status = SaveStatus::Idle;
            self.save_seq += 1;
        }

        Ok(RenderTicket {
            generation: self.generation,
            revision: draft.revision,
        })
    }

    /// Enter `Saving`. Diagnostics are left alone; they describe the markup,
    /// not persistence.
    pub fn begin_save(&mut self) -> Result<SaveRequest, SessionError> {
        self.ensure_alive()?;
        let draft = self.draft.as_mut().ok_or(SessionError::NoDraft)?;
        if draft.save_status == SaveStatus::Saving {
            return Err(SessionError::SaveInProgress);
        }

        // A new save supersedes any pending revert of the previous one
        self.save_seq += 1;
        draft.save_status = SaveStatus::Saving;

        Ok(SaveRequest {
            template_id: draft.template.id.clone(),
            source: draft.source_text.clone(),
            token: SaveToken(self.save_seq),
        })
    }

    /// Record the store's answer to a save.
    ///
    /// On success the draft is clean and `Saved`; the caller should arm the
    /// revert timer with the returned token. `NotFound` ends the session.
    /// Any other store error puts the draft back to `Idle` and is returned.
    pub fn complete_save(
        &mut self,
        token: SaveToken,
        outcome: Result<Template, StoreError>,
    ) -> Result<(SaveToken, Template), SessionError> {
        self.ensure_alive()?;
        if token.0 != self.save_seq {
            return Err(SessionError::SaveInProgress);
        }
        let draft = self.draft.as_mut().ok_or(SessionError::NoDraft)?;

        match outcome {
            Ok(saved) => {
                draft.dirty = draft.source_text != saved.source;
                draft.template = saved.clone();
                draft.save_status = SaveStatus::Saved;
                info!(template_id = %saved.id, "Template saved");
                Ok((token, saved))
            }
            Err(StoreError::NotFound(id)) => {
                error!(template_id = %id, "Save failed, open template is gone");
                draft.save_status = SaveStatus::Idle;
                let failure = SessionError::Vanished(id);
                self.failure = Some(failure.clone());
                Err(failure)
            }
            Err(err) => {
                warn!(template_id = %draft.template.id, error = %err, "Save rejected by the store");
                draft.save_status = SaveStatus::Idle;
                Err(SessionError::Store(err))
            }
        }
    }

    /// `Saved` falls back to `Clean`, unless a later save or edit got there
    /// first. Returns whether anything changed.
    pub fn expire_saved(&mut self, token: SaveToken) -> bool {
        if token.0 != self.save_seq {
            return false;
        }
        match self.draft.as_mut() {
            Some(draft) if draft.save_status == SaveStatus::Saved => {
                draft.save_status = SaveStatus::Idle;
                true
            }
            _ => false,
        }
    }

    /// True if `ticket` still describes the live draft text
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.failure.is_none()
            && ticket.generation == self.generation
            && self
                .draft
                .as_ref()
                .is_some_and(|d| d.revision == ticket.revision)
    }

    /// Source to compile for `ticket`, or `None` if the ticket is stale
    pub fn render_source(&self, ticket: RenderTicket) -> Option<&str> {
        if !self.is_current(ticket) {
            return None;
        }
        self.draft.as_ref().map(|d| d.source_text.as_str())
    }

    /// Apply a settled compile. Stale results are dropped and `false`
    /// returned. Never touches dirtiness.
    pub fn apply_render(&mut self, ticket: RenderTicket, result: CompileResult) -> bool {
        if !self.is_current(ticket) {
            debug!(?ticket, generation = self.generation, "Dropping stale compile result");
            return false;
        }
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };

        match result {
            CompileResult::Html(html) => {
                draft.preview_html = html;
                draft.diagnostics.clear();
            }
            CompileResult::Diagnostics(diagnostics) => {
                draft.diagnostics = diagnostics;
            }
        }
        true
    }

    /// Hide the diagnostics list until the next compile
    pub fn dismiss_diagnostics(&mut self) {
        if let Some(draft) = self.draft.as_mut() {
            draft.diagnostics.clear();
        }
    }

    /// Drop the draft. Outstanding tickets become stale.
    pub fn close(&mut self) {
        if self.draft.take().is_some() {
            self.generation += 1;
        }
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        match &self.failure {
            Some(failure) => Err(SessionError::Terminated(failure.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestmail_common::{PropertyId, Stage};

    fn property() -> Property {
        Property {
            id: PropertyId::from("hotel-1"),
            name: "Adina Town Hall".to_string(),
            location: "Sydney, Australia".to_string(),
            image_url: String::new(),
        }
    }

    fn template(id: &str, source: &str) -> Template {
        Template {
            id: TemplateId::from(id),
            owner_id: PropertyId::from("hotel-1"),
            name: format!("Template {}", id),
            stage: Stage::PreArrival,
            source: source.to_string(),
        }
    }

    fn saved(id: &str, source: &str) -> Result<Template, StoreError> {
        Ok(template(id, source))
    }

    #[test]
    fn test_starts_empty() {
        let mut session = EditingSession::new(property());
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.edit_source("x"), Err(SessionError::NoDraft));
        assert_eq!(session.begin_save(), Err(SessionError::NoDraft));
    }

    #[test]
    fn test_open_resets_draft_regardless_of_previous_state() {
        let mut session = EditingSession::new(property());
        let first = session.open_template(template("t1", "<a/>")).unwrap();
        session.edit_source("<a>changed</a>").unwrap();
        session.apply_render(
            RenderTicket { generation: first.generation, revision: 1 },
            CompileResult::Diagnostics(vec![Diagnostic::new("bad")]),
        );
        assert_eq!(session.state(), SessionState::Dirty);

        session.open_template(template("t2", "<b/>")).unwrap();

        let draft = session.draft().unwrap();
        assert_eq!(draft.source_text(), "<b/>");
        assert!(draft.diagnostics().is_empty());
        assert!(!draft.is_dirty());
        assert_eq!(draft.preview_html(), "");
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_open_rejects_other_property() {
        let mut session = EditingSession::new(property());
        let mut foreign = template("t1", "");
        foreign.owner_id = PropertyId::from("hotel-2");

        assert_eq!(
            session.open_template(foreign),
            Err(SessionError::ForeignTemplate(TemplateId::from("t1")))
        );
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_stale_ticket_after_switch_is_ignored() {
        let mut session = EditingSession::new(property());
        let ticket_a = session.open_template(template("a", "<a/>")).unwrap();
        let ticket_b = session.open_template(template("b", "<b/>")).unwrap();
        assert!(session.apply_render(ticket_b, CompileResult::Html("<p>B</p>".to_string())));

        assert!(session.render_source(ticket_a).is_none());
        assert!(!session.apply_render(ticket_a, CompileResult::Html("<p>A</p>".to_string())));
        assert!(!session.apply_render(
            ticket_a,
            CompileResult::Diagnostics(vec![Diagnostic::new("from A")])
        ));

        let draft = session.draft().unwrap();
        assert_eq!(draft.preview_html(), "<p>B</p>");
        assert!(draft.diagnostics().is_empty());
    }

    #[test]
    fn test_superseded_edit_ticket_is_stale() {
        let mut session = EditingSession::new(property());
        session.open_template(template("t1", "")).unwrap();
        let older = session.edit_source("<a>").unwrap();
        let newer = session.edit_source("<a></a>").unwrap();

        assert!(!session.is_current(older));
        assert_eq!(session.render_source(newer), Some("<a></a>"));
    }

    #[test]
    fn test_diagnostics_keep_last_good_preview() {
        let mut session = EditingSession::new(property());
        let ticket = session.open_template(template("t1", "<ok/>")).unwrap();
        session.apply_render(ticket, CompileResult::Html("<p>ok</p>".to_string()));

        let ticket = session.edit_source("<broken").unwrap();
        session.apply_render(
            ticket,
            CompileResult::Diagnostics(vec![Diagnostic::new("Malformed")]),
        );

        let draft = session.draft().unwrap();
        assert_eq!(draft.preview_html(), "<p>ok</p>");
        assert_eq!(draft.diagnostics().len(), 1);
        // Compiles never change dirtiness
        assert!(draft.is_dirty());

        session.dismiss_diagnostics();
        assert!(session.draft().unwrap().diagnostics().is_empty());
    }

    #[test]
    fn test_save_cycle() {
        let mut session = EditingSession::new(property());
        let ticket = session.open_template(template("t1", "<a/>")).unwrap();
        session.apply_render(ticket, CompileResult::Diagnostics(vec![Diagnostic::new("x")]));
        session.edit_source("<b/>").unwrap();

        let request = session.begin_save().unwrap();
        assert_eq!(session.state(), SessionState::Saving);
        assert_eq!(request.source, "<b/>");
        assert_eq!(session.begin_save(), Err(SessionError::SaveInProgress));

        let (token, stored) = session
            .complete_save(request.token, saved("t1", "<b/>"))
            .unwrap();
        assert_eq!(stored.source, "<b/>");
        assert_eq!(session.state(), SessionState::Saved);
        let draft = session.draft().unwrap();
        assert!(!draft.is_dirty());
        assert_eq!(draft.template().source, "<b/>");
        // Saving leaves diagnostics alone
        assert_eq!(draft.diagnostics().len(), 1);

        assert!(session.expire_saved(token));
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_clean_draft_can_be_saved() {
        let mut session = EditingSession::new(property());
        session.open_template(template("t1", "<a/>")).unwrap();
        let request = session.begin_save().unwrap();
        assert_eq!(request.source, "<a/>");
    }

    #[test]
    fn test_second_save_invalidates_first_revert() {
        let mut session = EditingSession::new(property());
        session.open_template(template("t1", "<a/>")).unwrap();

        let first = session.begin_save().unwrap();
        let (first_token, _) = session.complete_save(first.token, saved("t1", "<a/>")).unwrap();

        let second = session.begin_save().unwrap();
        let (second_token, _) = session.complete_save(second.token, saved("t1", "<a/>")).unwrap();

        assert!(!session.expire_saved(first_token));
        assert_eq!(session.state(), SessionState::Saved);
        assert!(session.expire_saved(second_token));
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_edit_while_saved_goes_dirty() {
        let mut session = EditingSession::new(property());
        session.open_template(template("t1", "<a/>")).unwrap();
        let request = session.begin_save().unwrap();
        let (token, _) = session.complete_save(request.token, saved("t1", "<a/>")).unwrap();

        session.edit_source("<a>more</a>").unwrap();
        assert_eq!(session.state(), SessionState::Dirty);
        assert!(!session.expire_saved(token));
        assert_eq!(session.state(), SessionState::Dirty);
    }

    #[test]
    fn test_not_found_is_terminal() {
        let mut session = EditingSession::new(property());
        let ticket = session.open_template(template("t1", "<a/>")).unwrap();
        let request = session.begin_save().unwrap();

        let err = session
            .complete_save(request.token, Err(StoreError::NotFound(TemplateId::from("t1"))))
            .unwrap_err();
        assert_eq!(err, SessionError::Vanished(TemplateId::from("t1")));
        assert_eq!(session.state(), SessionState::Failed);

        assert!(matches!(session.edit_source("x"), Err(SessionError::Terminated(_))));
        assert!(matches!(session.begin_save(), Err(SessionError::Terminated(_))));
        assert!(matches!(
            session.open_template(template("t2", "")),
            Err(SessionError::Terminated(_))
        ));
        assert!(!session.apply_render(ticket, CompileResult::Html(String::new())));
    }

    #[test]
    fn test_other_store_errors_are_not_terminal() {
        let mut session = EditingSession::new(property());
        session.open_template(template("t1", "<a/>")).unwrap();
        session.edit_source("<a>more</a>").unwrap();
        let request = session.begin_save().unwrap();

        let rejection = StoreError::DuplicateId(TemplateId::from("t1"));
        let err = session
            .complete_save(request.token, Err(rejection.clone()))
            .unwrap_err();
        assert_eq!(err, SessionError::Store(rejection));
        assert!(session.failure().is_none());
        assert_eq!(session.state(), SessionState::Dirty);

        // The draft is intact and a retry goes through
        let retry = session.begin_save().unwrap();
        assert_eq!(retry.source, "<a>more</a>");
        session.complete_save(retry.token, saved("t1", "<a>more</a>")).unwrap();
        assert_eq!(session.state(), SessionState::Saved);
    }

    #[test]
    fn test_close_invalidates_tickets() {
        let mut session = EditingSession::new(property());
        let ticket = session.open_template(template("t1", "<a/>")).unwrap();
        assert_eq!(session.generation(), ticket.generation);
        session.close();

        assert_eq!(session.state(), SessionState::Empty);
        assert!(!session.is_current(ticket));
        assert_eq!(session.generation(), ticket.generation + 1);

        // Closing with nothing open does not burn a generation
        session.close();
        assert_eq!(session.generation(), ticket.generation + 1);
    }
}
