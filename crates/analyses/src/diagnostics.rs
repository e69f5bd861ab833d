use pyevm_parser::{ast::Span, highlight_span, line_col};
use std::fmt;

/// A construct the permissive compiler accepts by substituting a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self { message: message.into(), span }
    }

    /// `line:column: message` followed by the source excerpt.
    pub fn render(&self, source: &str) -> String {
        let (line, column) = line_col(source, self.span.start);
        let mut out = format!("{line}:{column}: {}\n", self.message);
        // Writing into a String cannot fail.
        let _ = highlight_span(&mut out, source, self.span, 0);
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
