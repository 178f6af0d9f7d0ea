//! # Session Driver
//!
//! Runs one [`EditingSession`] on a single task. Commands arrive from a
//! [`SessionHandle`], timer expiries and compile results as
//! [`SessionEvent`]s; everything is handled one at a time, so the session
//! never needs a lock. After every change a fresh [`SessionSnapshot`] is
//! published on a `watch` channel.
//!
//! The debounce timer starts a compile on its own task, never straight from
//! an edit. The driver keeps serving commands while it runs and applies the
//! result only if the draft has not moved on.

use guestmail_common::{Property, Template, TemplateId};
use guestmail_compiler::{RenderAdapter, TokenContext};
use guestmail_store::SharedStore;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::SessionError;
use crate::scheduler::{arm, RenderScheduler, SessionEvent};
use crate::session::{EditingSession, RenderTicket, SaveToken};
use crate::snapshot::SessionSnapshot;

/// Delays used by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorTimings {
    /// Quiet period after the last edit before compiling
    pub debounce: Duration,
    /// How long the busy indicator stays on after a compile settles
    pub busy_linger: Duration,
    /// How long "Saved" is shown before returning to clean
    pub saved_revert: Duration,
}

impl Default for EditorTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            busy_linger: Duration::from_millis(300),
            saved_revert: Duration::from_millis(1500),
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

#[derive(Debug)]
enum Command {
    Open { id: TemplateId, reply: Reply<()> },
    Edit { text: String, reply: Reply<()> },
    Save { reply: Reply<Template> },
    DismissDiagnostics { reply: Reply<()> },
    Close { reply: Reply<()> },
    SwitchProperty { property: Property, reply: Reply<()> },
    Shutdown,
}

/// Start a session for `property` on the current tokio runtime
pub fn spawn_session(
    property: Property,
    store: SharedStore,
    adapter: RenderAdapter,
    timings: EditorTimings,
) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let session = EditingSession::new(property);
    let (updates, snapshots) = watch::channel(SessionSnapshot::capture(&session, false, false));

    let driver = SessionDriver {
        tokens: TokenContext::for_property(session.property()),
        session,
        store,
        adapter,
        scheduler: RenderScheduler::new(timings.debounce, timings.busy_linger, event_tx.clone()),
        timings,
        events: event_tx,
        saved_expiry: None,
        updates,
    };
    tokio::spawn(driver.run(command_rx, event_rx));

    SessionHandle {
        commands: command_tx,
        snapshots,
    }
}

/// Cheap, cloneable front end to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Open a stored template, replacing the current draft
    pub async fn open(&self, id: TemplateId) -> Result<(), SessionError> {
        self.request(|reply| Command::Open { id, reply }).await
    }

    pub async fn edit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();
        self.request(|reply| Command::Edit { text, reply }).await
    }

    /// Write the draft to the store, returning the stored template
    pub async fn save(&self) -> Result<Template, SessionError> {
        self.request(|reply| Command::Save { reply }).await
    }

    pub async fn dismiss_diagnostics(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::DismissDiagnostics { reply }).await
    }

    /// Drop the draft without saving
    pub async fn close(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Close { reply }).await
    }

    /// Start over for another property. Any draft is discarded.
    pub async fn switch_property(&self, property: Property) -> Result<(), SessionError> {
        self.request(|reply| Command::SwitchProperty { property, reply })
            .await
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }
}

struct SessionDriver {
    session: EditingSession,
    store: SharedStore,
    adapter: RenderAdapter,
    tokens: TokenContext,
    scheduler: RenderScheduler,
    timings: EditorTimings,
    events: UnboundedSender<SessionEvent>,
    saved_expiry: Option<JoinHandle<()>>,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionDriver {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: UnboundedReceiver<SessionEvent>,
    ) {
        info!(property_id = %self.session.property().id, "Editing session started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = events.recv() => {
                    self.handle_event(event);
                    self.publish();
                }
            }
        }

        self.cancel_timers();
        info!(property_id = %self.session.property().id, "Editing session ended");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open { id, reply } => {
                let result = self.open(id);
                self.respond(reply, result);
            }
            Command::Edit { text, reply } => {
                let result = self.session.edit_source(text).map(|ticket| {
                    self.cancel_saved_expiry();
                    self.scheduler.schedule(ticket);
                });
                self.respond(reply, result);
            }
            Command::Save { reply } => {
                let result = self.save();
                self.respond(reply, result);
            }
            Command::DismissDiagnostics { reply } => {
                self.session.dismiss_diagnostics();
                self.respond(reply, Ok(()));
            }
            Command::Close { reply } => {
                self.cancel_timers();
                self.session.close();
                self.respond(reply, Ok(()));
            }
            Command::SwitchProperty { property, reply } => {
                self.cancel_timers();
                info!(property_id = %property.id, "Switching property, closing draft");
                self.tokens = TokenContext::for_property(&property);
                self.session = EditingSession::new(property);
                self.respond(reply, Ok(()));
            }
            // Handled by the run loop
            Command::Shutdown => {}
        }
    }

    /// Publish first so the caller sees its own change once the reply lands
    fn respond<T>(&self, reply: Reply<T>, result: Result<T, SessionError>) {
        self.publish();
        let _ = reply.send(result);
    }

    fn open(&mut self, id: TemplateId) -> Result<(), SessionError> {
        let template = self
            .store
            .lock()
            .get(&id)
            .cloned()
            .ok_or(SessionError::TemplateNotFound(id))?;

        let ticket = self.session.open_template(template)?;
        self.cancel_timers();
        self.scheduler.schedule(ticket);
        Ok(())
    }

    fn save(&mut self) -> Result<Template, SessionError> {
        let request = self.session.begin_save()?;
        self.publish();

        let outcome = self
            .store
            .lock()
            .update(&request.template_id, request.source);

        match self.session.complete_save(request.token, outcome) {
            Ok((token, saved)) => {
                self.arm_saved_expiry(token);
                Ok(saved)
            }
            Err(err @ SessionError::Store(_)) => {
                warn!(error = %err, "Save rejected, draft kept");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Session failed during save");
                self.cancel_timers();
                Err(err)
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RenderDue(ticket) => self.render(ticket),
            SessionEvent::CompileSettled(ticket, result) => {
                if !self.scheduler.compile_settled(ticket) {
                    debug!(?ticket, "Ignoring result of an aborted compile");
                    return;
                }
                let ok = result.is_ok();
                let applied = self.session.apply_render(ticket, result);
                debug!(?ticket, ok, applied, "Compile settled");
            }
            SessionEvent::BusyOff(epoch) => {
                self.scheduler.busy_off(epoch);
            }
            SessionEvent::SavedExpired(token) => {
                if self.session.expire_saved(token) {
                    self.saved_expiry = None;
                }
            }
        }
    }

    fn render(&mut self, ticket: RenderTicket) {
        if !self.scheduler.take_due(ticket) {
            debug!(?ticket, "Ignoring superseded render timer");
            return;
        }
        let Some(source) = self.session.render_source(ticket).map(str::to_owned) else {
            debug!(?ticket, "Ignoring render for a closed draft");
            return;
        };

        let adapter = self.adapter.clone();
        let tokens = self.tokens.clone();
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let result = adapter.render(&source, &tokens).await;
            let _ = events.send(SessionEvent::CompileSettled(ticket, result));
        });
        self.scheduler.compile_started(ticket, task);
    }

    fn arm_saved_expiry(&mut self, token: SaveToken) {
        self.cancel_saved_expiry();
        self.saved_expiry = Some(arm(
            self.timings.saved_revert,
            &self.events,
            SessionEvent::SavedExpired(token),
        ));
    }

    fn cancel_saved_expiry(&mut self) {
        if let Some(handle) = self.saved_expiry.take() {
            handle.abort();
        }
    }

    fn cancel_timers(&mut self) {
        self.scheduler.cancel();
        self.cancel_saved_expiry();
    }

    fn publish(&self) {
        self.updates.send_replace(SessionSnapshot::capture(
            &self.session,
            self.scheduler.is_busy(),
            self.scheduler.is_pending(),
        ));
    }
}
