//! # Guestmail Store
//!
//! In-memory persistence for properties and their email templates.
//!
//! ```text
//! PropertyCatalog ── owns ids ──┐
//!                               ▼
//! DocumentStore: Template { id, owner_id, name, stage, source }
//!                               ▲
//! Workspace ── onboarding (clone base set), new-template flow
//! ```
//!
//! Nothing here outlives the process.

mod base;
mod catalog;
mod document_store;
mod workspace;

pub use base::{base_templates, starter_source, BaseTemplate};
pub use catalog::{default_brands, BrandFilter, PropertyCatalog};
pub use document_store::{DocumentStore, SharedStore};
pub use workspace::{group_by_stage, Workspace};
