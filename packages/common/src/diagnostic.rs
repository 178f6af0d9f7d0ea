use serde::{Deserialize, Serialize};
use std::fmt;

/// Problem the markup compiler reported about a source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            tag: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, &self.tag) {
            (Some(line), Some(tag)) => write!(f, "Line {} ({}): {}", line, tag, self.message),
            (Some(line), None) => write!(f, "Line {}: {}", line, self.message),
            (None, Some(tag)) => write!(f, "({}): {}", tag, self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// Outcome of rendering one source text.
///
/// Never both: when the compiler reports diagnostics its html is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompileResult {
    Html(String),
    Diagnostics(Vec<Diagnostic>),
}

impl CompileResult {
    pub fn html(&self) -> Option<&str> {
        match self {
            CompileResult::Html(html) => Some(html),
            CompileResult::Diagnostics(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileResult::Html(_) => &[],
            CompileResult::Diagnostics(diagnostics) => diagnostics,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CompileResult::Html(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let d = Diagnostic::new("mj-texte is not a valid tag")
            .at_line(5)
            .with_tag("mj-texte");
        assert_eq!(d.to_string(), "Line 5 (mj-texte): mj-texte is not a valid tag");
        assert_eq!(Diagnostic::new("boom").to_string(), "boom");
    }

    #[test]
    fn test_accessors() {
        let ok = CompileResult::Html("<p>hi</p>".to_string());
        assert_eq!(ok.html(), Some("<p>hi</p>"));
        assert!(ok.diagnostics().is_empty());

        let bad = CompileResult::Diagnostics(vec![Diagnostic::new("x")]);
        assert!(bad.html().is_none());
        assert_eq!(bad.diagnostics().len(), 1);
        assert!(!bad.is_ok());
    }
}
