//! Front end for contract sources written in Python class syntax.
//!
//! [`parse`] turns source text into an [`ast::Module`]. Only syntax is checked
//! here; deciding what the contract means is left to the analyzer.

pub mod ast;
pub mod lexer;
pub mod parser;

use ast::{Module, Span};
use smallvec::SmallVec;
use std::fmt;

/// Syntax error with a 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(source: &str, span: Span, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, span.start);
        Self { message: message.into(), span, line, column }
    }

    /// Message followed by the offending source line with a caret underline.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("error: {self}\n");
        // Writing into a String cannot fail.
        let _ = highlight_span(&mut out, source, self.span, 1);
        out
    }
}

pub fn parse(source: &str) -> Result<Module, ParseError> {
    let module = parser::Parser::new(source)?.parse_module()?;
    tracing::debug!(target: "parser", statements = module.body.len(), "parsed module");
    Ok(module)
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset.min(source.len())).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
    (line, column)
}

pub fn highlight_span(
    out: &mut impl fmt::Write,
    source: &str,
    span: Span,
    line_range: usize,
) -> fmt::Result {
    let mut line_ends: SmallVec<[usize; 256]> = SmallVec::new();
    line_ends.extend(source.char_indices().filter_map(|(i, c)| (c == '\n').then_some(i)));
    if !source.ends_with('\n') {
        line_ends.push(source.len());
    }
    let Some(last) = line_ends.len().checked_sub(1) else {
        return Ok(());
    };

    let line = line_ends.partition_point(|&end| end < span.start).min(last);
    let show_start = line.saturating_sub(line_range);
    let show_end = (line + line_range).min(last);
    let dig_width = ((show_end + 1).ilog10() + 1) as usize;

    for i in show_start..=show_end {
        let line_start = if i == 0 { 0 } else { line_ends[i - 1] + 1 };
        let line_end = line_ends[i];
        let text = source[line_start..line_end].trim_end_matches('\r');
        writeln!(out, "{:>dig_width$} | {}", i + 1, text)?;

        if i == line {
            let from = span.start.clamp(line_start, line_end);
            let to = span.end.clamp(from, line_end);
            let column = source[line_start..from].chars().count();
            let width = source[from..to].chars().count().max(1);
            writeln!(out, "{:dig_width$} | {}{}", "", " ".repeat(column), "^".repeat(width))?;
        }
    }
    Ok(())
}
