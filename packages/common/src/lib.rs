//! Shared data model for guestmail: properties, templates, journey stages and
//! compiler diagnostics, plus the error taxonomy every crate reports through.

pub mod diagnostic;
pub mod error;
pub mod model;
pub mod result;
pub mod stage;

pub use diagnostic::*;
pub use error::*;
pub use model::*;
pub use result::*;
pub use stage::*;
