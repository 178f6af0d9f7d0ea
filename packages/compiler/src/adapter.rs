use guestmail_common::{CompileResult, Diagnostic};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::compiler::{CompileError, CompileOptions, MarkupCompiler};
use crate::tokens::TokenContext;

/// Preview shown when no compiler is available
pub const UNAVAILABLE_HTML: &str = "<p>Markup renderer not available.</p>";

/// Diagnostic text used when a compiler fails without saying why
pub const UNKNOWN_FAILURE: &str = "An unknown parsing error occurred.";

/// Wraps an optional compiler and normalizes everything it can do into a
/// [`CompileResult`]. Rendering never fails.
#[derive(Clone)]
pub struct RenderAdapter {
    compiler: Option<Arc<dyn MarkupCompiler>>,
    options: CompileOptions,
}

impl RenderAdapter {
    pub fn new(compiler: Arc<dyn MarkupCompiler>) -> Self {
        Self {
            compiler: Some(compiler),
            options: CompileOptions::default(),
        }
    }

    /// Adapter with no compiler behind it (degraded mode)
    pub fn unavailable() -> Self {
        Self {
            compiler: None,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_available(&self) -> bool {
        self.compiler.is_some()
    }

    /// Render `source` after substituting `tokens`.
    pub async fn render(&self, source: &str, tokens: &TokenContext) -> CompileResult {
        if source.trim().is_empty() {
            return CompileResult::Html(String::new());
        }

        let Some(compiler) = &self.compiler else {
            return CompileResult::Html(UNAVAILABLE_HTML.to_string());
        };

        let prepared = tokens.substitute(source);
        match compiler.compile(&prepared, &self.options).await {
            Ok(output) if !output.diagnostics.is_empty() => {
                debug!(count = output.diagnostics.len(), "Compiler reported diagnostics");
                CompileResult::Diagnostics(output.diagnostics)
            }
            Ok(output) => CompileResult::Html(output.html),
            Err(CompileError::Unavailable(reason)) => {
                warn!(%reason, "Markup renderer unavailable, showing placeholder");
                CompileResult::Html(UNAVAILABLE_HTML.to_string())
            }
            Err(err) => {
                warn!(error = %err, "Markup compilation failed");
                CompileResult::Diagnostics(vec![failure_diagnostic(&err)])
            }
        }
    }
}

impl fmt::Debug for RenderAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderAdapter")
            .field("available", &self.is_available())
            .field("options", &self.options)
            .finish()
    }
}

fn failure_diagnostic(err: &CompileError) -> Diagnostic {
    let message = match err {
        CompileError::Failed(message) => message.trim().to_string(),
        other => other.to_string(),
    };

    if message.is_empty() {
        Diagnostic::new(UNKNOWN_FAILURE)
    } else {
        Diagnostic::new(message)
    }
}
