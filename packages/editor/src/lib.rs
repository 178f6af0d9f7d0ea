//! # Guestmail Editor
//!
//! Editing engine for a single property's email templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ SessionHandle: open / edit / save / close   │
//! └─────────────────────────────────────────────┘
//!                     ↓ commands
//! ┌─────────────────────────────────────────────┐
//! │ driver: one task per session                │
//! │  - EditingSession state machine             │
//! │  - RenderScheduler debounce + busy linger   │
//! │  - saved-indicator revert timer             │
//! └─────────────────────────────────────────────┘
//!          ↓ compile                 ↓ update
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ compiler: adapter    │  │ store: templates     │
//! └──────────────────────┘  └──────────────────────┘
//!                     ↓
//!          watch::Receiver<SessionSnapshot>
//! ```
//!
//! ## Core Principles
//!
//! 1. **Draft is source of truth**: preview and diagnostics are derived from it
//! 2. **Latest edit wins**: a compile result is applied only if no open or
//!    edit happened after it was scheduled
//! 3. **Compiles never fail the session**: every outcome is html or diagnostics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guestmail_editor::{spawn_session, EditorTimings};
//!
//! let session = spawn_session(property, store, adapter, EditorTimings::default());
//! session.open(template_id).await?;
//! session.edit("<mjml>...</mjml>").await?;
//! session.save().await?;
//!
//! let snapshot = session.snapshot();
//! println!("{}", snapshot.preview_html());
//! ```
//!
//! [`SplitPane`] lives beside the session and knows nothing about it.

mod driver;
mod errors;
mod layout;
mod scheduler;
mod session;
mod snapshot;

pub use driver::{spawn_session, EditorTimings, SessionHandle};
pub use errors::SessionError;
pub use layout::{PointerId, PreviewViewport, SplitPane};
pub use scheduler::{RenderScheduler, SessionEvent};
pub use session::{
    Draft, EditingSession, RenderTicket, SaveRequest, SaveStatus, SaveToken, SessionState,
};
pub use snapshot::SessionSnapshot;
