//! Debounced render scheduling and the busy indicator.
//!
//! Timers are plain spawned sleeps that post a [`SessionEvent`] back to the
//! session driver, and compiles run on their own task that posts its result
//! the same way. Re-arming aborts the previous task, but an event already
//! sitting in the channel can still arrive late, so every event carries the
//! ticket or epoch it was armed with and is checked on receipt.

use guestmail_common::CompileResult;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::{RenderTicket, SaveToken};

/// Timer expiries and finished compiles delivered to the driver loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RenderDue(RenderTicket),
    CompileSettled(RenderTicket, CompileResult),
    BusyOff(u64),
    SavedExpired(SaveToken),
}

/// Spawn a one-shot timer posting `event` after `delay`
pub(crate) fn arm(
    delay: Duration,
    events: &UnboundedSender<SessionEvent>,
    event: SessionEvent,
) -> JoinHandle<()> {
    let events = events.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        // Driver gone means nobody cares any more
        let _ = events.send(event);
    })
}

#[derive(Debug)]
pub struct RenderScheduler {
    debounce: Duration,
    busy_linger: Duration,
    events: UnboundedSender<SessionEvent>,
    pending: Option<(RenderTicket, JoinHandle<()>)>,
    in_flight: Option<(RenderTicket, JoinHandle<()>)>,
    busy: bool,
    busy_epoch: u64,
    linger: Option<JoinHandle<()>>,
}

impl RenderScheduler {
    pub fn new(
        debounce: Duration,
        busy_linger: Duration,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            debounce,
            busy_linger,
            events,
            pending: None,
            in_flight: None,
            busy: false,
            busy_epoch: 0,
            linger: None,
        }
    }

    /// Restart the debounce window for `ticket`. Whatever was pending is
    /// superseded and will never compile.
    pub fn schedule(&mut self, ticket: RenderTicket) {
        if let Some((superseded, handle)) = self.pending.take() {
            handle.abort();
            debug!(?superseded, "Superseded pending render");
        }

        let handle = arm(self.debounce, &self.events, SessionEvent::RenderDue(ticket));
        debug!(?ticket, debounce_ms = self.debounce.as_millis() as u64, "Render scheduled");
        self.pending = Some((ticket, handle));
    }

    /// Claim a fired render. `false` means the ticket was superseded or
    /// cancelled after its timer had already posted.
    pub fn take_due(&mut self, ticket: RenderTicket) -> bool {
        match &self.pending {
            Some((pending, _)) if *pending == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Busy turns on as a compile starts. At most one compile runs; a
    /// newer one aborts whatever is still in flight.
    pub fn compile_started(&mut self, ticket: RenderTicket, task: JoinHandle<()>) {
        if let Some((superseded, handle)) = self.in_flight.replace((ticket, task)) {
            handle.abort();
            debug!(?superseded, "Aborted in-flight compile");
        }
        if let Some(linger) = self.linger.take() {
            linger.abort();
        }
        self.busy_epoch += 1;
        self.busy = true;
    }

    /// ...and off a short while after it settles, so fast compiles don't
    /// flicker. `false` means the result belongs to a compile that was
    /// aborted or cancelled and must be dropped.
    pub fn compile_settled(&mut self, ticket: RenderTicket) -> bool {
        match &self.in_flight {
            Some((running, _)) if *running == ticket => self.in_flight = None,
            _ => return false,
        }
        self.linger = Some(arm(
            self.busy_linger,
            &self.events,
            SessionEvent::BusyOff(self.busy_epoch),
        ));
        true
    }

    pub fn is_compiling(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns whether the indicator changed
    pub fn busy_off(&mut self, epoch: u64) -> bool {
        if epoch != self.busy_epoch || !self.busy {
            return false;
        }
        self.busy = false;
        self.linger = None;
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Drop every timer; the document changed or the session is ending
    pub fn cancel(&mut self) {
        if let Some((ticket, handle)) = self.pending.take() {
            handle.abort();
            debug!(?ticket, "Cancelled pending render");
        }
        if let Some((ticket, handle)) = self.in_flight.take() {
            handle.abort();
            debug!(?ticket, "Cancelled in-flight compile");
        }
        if let Some(linger) = self.linger.take() {
            linger.abort();
        }
        self.busy = false;
        self.busy_epoch += 1;
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
