//! Tokenizer for the contract source language.
//!
//! Raw tokens come from a `logos` automaton. [`tokenize`] then layers the
//! indentation-sensitive structure on top: `Newline` tokens are dropped inside
//! brackets and on blank lines, and `Indent`/`Dedent` tokens are synthesized
//! from the leading whitespace of each logical line.

use crate::{ParseError, ast::Span};
use alloy_primitives::U256;
use logos::{Lexer, Logos};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub value: String,
    pub is_bytes: bool,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")]
#[logos(skip r"#[^\r\n]*")]
#[logos(skip r"\\\r?\n")]
pub enum Token {
    // Keywords
    #[token("def")]
    Def,
    #[token("class")]
    Class,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("return")]
    Return,
    #[token("pass")]
    Pass,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("is")]
    Is,
    #[token("raise")]
    Raise,
    #[token("assert")]
    Assert,
    #[token("del")]
    Del,
    #[token("try")]
    Try,
    #[token("except")]
    Except,
    #[token("finally")]
    Finally,
    #[token("with")]
    With,
    #[token("global")]
    Global,
    #[token("nonlocal")]
    Nonlocal,
    #[token("lambda")]
    Lambda,
    #[token("None")]
    NoneLit,
    #[token("True")]
    True,
    #[token("False")]
    False,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Name(String),

    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| parse_radix(lex, 16))]
    #[regex(r"0[oO][0-7_]+", |lex| parse_radix(lex, 8))]
    #[regex(r"0[bB][01_]+", |lex| parse_radix(lex, 2))]
    #[regex(r"[0-9][0-9_]*", parse_decimal)]
    Int(U256),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", parse_float)]
    Float(f64),

    #[regex(r#"[rRbBuUfF]?[rRbBuUfF]?""#, lex_string)]
    #[regex(r"[rRbBuUfF]?[rRbBuUfF]?'", lex_string)]
    Str(StrLit),

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token("@")]
    At,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("&")]
    Amper,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqEqual,
    #[token("!=")]
    NotEqual,
    #[token("=")]
    Assign,
    #[token(":=")]
    ColonAssign,

    // Augmented assignment
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("//=")]
    DoubleSlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("**=")]
    DoubleStarAssign,
    #[token("<<=")]
    LeftShiftAssign,
    #[token(">>=")]
    RightShiftAssign,
    #[token("&=")]
    AmperAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,

    #[regex(r"\r?\n")]
    Newline,

    // Synthesized by `tokenize`, never produced by the automaton.
    Indent,
    Dedent,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Name(name) => return write!(f, "name `{name}`"),
            Token::Int(value) => return write!(f, "integer `{value}`"),
            Token::Float(value) => return write!(f, "float `{value}`"),
            Token::Str(_) => "string literal",
            Token::Newline => "newline",
            Token::Indent => "indent",
            Token::Dedent => "dedent",
            Token::Eof => "end of input",
            Token::Def => "`def`",
            Token::Class => "`class`",
            Token::If => "`if`",
            Token::Elif => "`elif`",
            Token::Else => "`else`",
            Token::While => "`while`",
            Token::For => "`for`",
            Token::In => "`in`",
            Token::Return => "`return`",
            Token::Pass => "`pass`",
            Token::Break => "`break`",
            Token::Continue => "`continue`",
            Token::Import => "`import`",
            Token::From => "`from`",
            Token::As => "`as`",
            Token::And => "`and`",
            Token::Or => "`or`",
            Token::Not => "`not`",
            Token::Is => "`is`",
            Token::Raise => "`raise`",
            Token::Assert => "`assert`",
            Token::Del => "`del`",
            Token::Try => "`try`",
            Token::Except => "`except`",
            Token::Finally => "`finally`",
            Token::With => "`with`",
            Token::Global => "`global`",
            Token::Nonlocal => "`nonlocal`",
            Token::Lambda => "`lambda`",
            Token::NoneLit => "`None`",
            Token::True => "`True`",
            Token::False => "`False`",
            Token::LParen => "`(`",
            Token::RParen => "`)`",
            Token::LBracket => "`[`",
            Token::RBracket => "`]`",
            Token::LBrace => "`{`",
            Token::RBrace => "`}`",
            Token::Comma => "`,`",
            Token::Colon => "`:`",
            Token::Semicolon => "`;`",
            Token::Dot => "`.`",
            Token::Ellipsis => "`...`",
            Token::Arrow => "`->`",
            Token::At => "`@`",
            Token::Plus => "`+`",
            Token::Minus => "`-`",
            Token::Star => "`*`",
            Token::DoubleStar => "`**`",
            Token::Slash => "`/`",
            Token::DoubleSlash => "`//`",
            Token::Percent => "`%`",
            Token::LeftShift => "`<<`",
            Token::RightShift => "`>>`",
            Token::Amper => "`&`",
            Token::Pipe => "`|`",
            Token::Caret => "`^`",
            Token::Tilde => "`~`",
            Token::Less => "`<`",
            Token::Greater => "`>`",
            Token::LessEqual => "`<=`",
            Token::GreaterEqual => "`>=`",
            Token::EqEqual => "`==`",
            Token::NotEqual => "`!=`",
            Token::Assign => "`=`",
            Token::ColonAssign => "`:=`",
            Token::PlusAssign => "`+=`",
            Token::MinusAssign => "`-=`",
            Token::StarAssign => "`*=`",
            Token::SlashAssign => "`/=`",
            Token::DoubleSlashAssign => "`//=`",
            Token::PercentAssign => "`%=`",
            Token::DoubleStarAssign => "`**=`",
            Token::LeftShiftAssign => "`<<=`",
            Token::RightShiftAssign => "`>>=`",
            Token::AmperAssign => "`&=`",
            Token::PipeAssign => "`|=`",
            Token::CaretAssign => "`^=`",
        };
        f.write_str(text)
    }
}

fn parse_radix(lex: &mut Lexer<'_, Token>, radix: u64) -> Option<U256> {
    let digits = lex.slice()[2..].replace('_', "");
    U256::from_str_radix(&digits, radix).ok()
}

fn parse_decimal(lex: &mut Lexer<'_, Token>) -> Option<U256> {
    let digits = lex.slice().replace('_', "");
    U256::from_str_radix(&digits, 10).ok()
}

fn parse_float(lex: &mut Lexer<'_, Token>) -> Option<f64> {
    lex.slice().replace('_', "").parse().ok()
}

/// Consumes the body of a string literal whose prefix and opening quote were
/// just matched. Handles single and triple quoting.
fn lex_string(lex: &mut Lexer<'_, Token>) -> Option<StrLit> {
    let opener = lex.slice();
    let quote = opener.chars().last()?;
    let prefix = &opener[..opener.len() - 1];
    let raw = prefix.contains(['r', 'R']);
    let is_bytes = prefix.contains(['b', 'B']);

    let (pair, triple) = if quote == '"' { ("\"\"", "\"\"\"") } else { ("''", "'''") };
    let rest = lex.remainder();
    let (body_start, closing) = if rest.starts_with(pair) { (2, triple) } else { (0, &triple[..1]) };
    let body = &rest[body_start..];

    let mut chars = body.char_indices();
    let mut end = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' if closing.len() == 1 => return None,
            c if c == quote && body[i..].starts_with(closing) => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }

    let end = end?;
    let text = &body[..end];
    lex.bump(body_start + end + closing.len());

    let value = if raw { text.to_owned() } else { unescape(text) };
    Some(StrLit { value, is_bytes })
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = (0..2).filter_map(|_| chars.next_if(|c| c.is_ascii_hexdigit())).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => out.push(char::from(byte)),
                    Err(_) => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Column width of leading whitespace; tabs advance to the next multiple of 8.
fn indent_width(leading: &str) -> usize {
    leading.chars().fold(0, |width, c| match c {
        ' ' => width + 1,
        '\t' => (width / 8 + 1) * 8,
        '\x0c' => 0,
        _ => width,
    })
}

/// Tokenizes `source` into a flat stream with layout tokens.
///
/// The indentation of the first logical line is the base level, so sources
/// embedded with a uniform margin tokenize the same as flush-left ones.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    let mut indents: Vec<usize> = Vec::new();
    let mut depth = 0usize;
    let mut at_line_start = true;
    let mut line_start = 0usize;

    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        let token = result.map_err(|()| {
            let text = &source[span.start..span.end];
            if text.ends_with(['"', '\'']) {
                ParseError::new(source, span, "unterminated string literal")
            } else {
                ParseError::new(source, span, format!("unexpected input `{text}`"))
            }
        })?;

        if token == Token::Newline {
            if depth == 0 {
                if !at_line_start {
                    tokens.push((Token::Newline, span));
                    at_line_start = true;
                }
                line_start = span.end;
            }
            continue;
        }

        if at_line_start {
            let width = indent_width(&source[line_start..span.start]);
            let at = Span::new(span.start, span.start);
            match indents.last().copied() {
                None => indents.push(width),
                Some(top) if width > top => {
                    indents.push(width);
                    tokens.push((Token::Indent, at));
                }
                Some(top) if width < top => {
                    while indents.last().is_some_and(|&level| width < level) && indents.len() > 1 {
                        indents.pop();
                        tokens.push((Token::Dedent, at));
                    }
                    if indents.last() != Some(&width) {
                        return Err(ParseError::new(
                            source,
                            at,
                            "unindent does not match any outer indentation level",
                        ));
                    }
                }
                Some(_) => {}
            }
            at_line_start = false;
        }

        match token {
            Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => depth = depth.saturating_sub(1),
            _ => {}
        }
        tokens.push((token, span));
    }

    let end = Span::new(source.len(), source.len());
    if !at_line_start {
        tokens.push((Token::Newline, end));
    }
    for _ in 1..indents.len() {
        tokens.push((Token::Dedent, end));
    }
    tokens.push((Token::Eof, end));

    tracing::trace!(target: "parser", count = tokens.len(), "tokenized source");
    Ok(tokens)
}
