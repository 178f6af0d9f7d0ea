//! Markup compiler boundary.
//!
//! The markup language itself is opaque here. A [`MarkupCompiler`] turns
//! source text into html plus diagnostics; [`RenderAdapter`] wraps one (or
//! none) and folds every outcome into a [`CompileResult`] so callers never
//! see a failure escape.
//!
//! [`CompileResult`]: guestmail_common::CompileResult

mod adapter;
mod compiler;
mod process;
mod tokens;

pub use adapter::{RenderAdapter, UNAVAILABLE_HTML, UNKNOWN_FAILURE};
pub use compiler::{CompileError, CompileOptions, CompileOutput, MarkupCompiler, ValidationLevel};
pub use process::{ProcessCompiler, DEFAULT_COMPILE_TIMEOUT};
pub use tokens::TokenContext;
