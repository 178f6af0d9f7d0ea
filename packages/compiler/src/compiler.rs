use async_trait::async_trait;
use guestmail_common::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a compiler can raise instead of producing output
#[derive(Error, Debug)]
pub enum CompileError {
    /// The compiler is not installed or could not be loaded
    #[error("Markup renderer not available: {0}")]
    Unavailable(String),

    /// The compiler gave up; the message may be empty
    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<String> for CompileError {
    fn from(s: String) -> Self {
        CompileError::Failed(s)
    }
}

impl From<&str> for CompileError {
    fn from(s: &str) -> Self {
        CompileError::Failed(s.to_string())
    }
}

/// How strictly the compiler should validate markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Strict,
    #[default]
    Soft,
    Skip,
}

impl ValidationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationLevel::Strict => "strict",
            ValidationLevel::Soft => "soft",
            ValidationLevel::Skip => "skip",
        }
    }
}

/// Options passed through to the compiler on every call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub validation_level: ValidationLevel,
    /// Minify the produced html
    #[serde(default)]
    pub minify: bool,
}

/// Raw compiler output; html and diagnostics may both be populated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            diagnostics: Vec::new(),
        }
    }
}

/// Markup-to-html compiler.
///
/// Implemented for any synchronous
/// `Fn(&str, &CompileOptions) -> Result<CompileOutput, CompileError>` so tests
/// and embedders can hand in a closure.
#[async_trait]
pub trait MarkupCompiler: Send + Sync {
    async fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError>;
}

#[async_trait]
impl<F> MarkupCompiler for F
where
    F: Fn(&str, &CompileOptions) -> Result<CompileOutput, CompileError> + Send + Sync,
{
    async fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError> {
        self(source, options)
    }
}
