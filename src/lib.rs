//! Front end of a small C-like compiler: lexer and expression parser.
//!
//! Source text is lexed into positioned [`Token`]s, then parsed into an
//! arena of [`Node`]s whose root sequence holds the top-level
//! expressions. Binary expressions are built right-nested and then
//! rotated until they respect the [`precedence`] table.
//!
//! # Quick start
//!
//! ```
//! use scratchc::{format_roots, parse, tokenize};
//!
//! let tokens = tokenize("a - b - c").unwrap();
//! let nodes = parse(&tokens).unwrap();
//! assert_eq!(format_roots(&nodes), ["((a - b) - c)"]);
//! ```
//!
//! ## One-shot compile unit
//!
//! ```
//! let unit = scratchc::compile_str("x = 0b101 * 2", Some("demo.c")).unwrap();
//! assert_eq!(unit.tokens.len(), 5);
//! assert_eq!(scratchc::format_roots(&unit.nodes), ["(x = (5 * 2))"]);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod compiler;
pub mod diagnostics;
pub mod formatter;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod precedence;
pub mod source;
pub mod token;

pub use compiler::{CompileStatus, CompileUnit, compile_str};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use formatter::{format_node, format_roots};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize, tokenize_named};
pub use node::{Binding, Node, NodeFlags, NodeId, NodeKind, NodeStacks, NodeValue};
pub use parser::{History, MAX_NESTING, ParseError, ParseErrorKind, Parser, parse};
pub use precedence::{Associativity, OperatorGroup, left_op_has_priority};
pub use source::{CharSource, StrSource};
pub use token::{Position, Token, TokenKind, TokenValue};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where the failure was detected.
    #[must_use]
    pub const fn position(&self) -> &Position {
        match self {
            Self::Lex(e) => &e.position,
            Self::Parse(e) => &e.position,
        }
    }

    /// The message without the trailing location.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Lex(e) => e.kind.to_string(),
            Self::Parse(e) => e.kind.to_string(),
        }
    }
}

/// Tokenize and parse a source string in one step.
pub fn parse_str(input: &str) -> Result<NodeStacks, Error> {
    let tokens = tokenize(input)?;
    Ok(parse(&tokens)?)
}
