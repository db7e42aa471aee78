//! Compile unit: everything one source file carries through the front end.

use std::rc::Rc;

use crate::Error;
use crate::diagnostics::Diagnostics;
use crate::lexer::Lexer;
use crate::node::NodeStacks;
use crate::parser::parse;
use crate::source::{CharSource, StrSource};
use crate::token::{Position, Token};

/// Outcome of running a whole unit, for drivers that report a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    CompiledOk,
    FailedWithErrors,
}

/// Tokens, node stacks, current position and warnings of one source file.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    /// Opaque flag word handed on to later stages.
    pub flags: u32,
    pub position: Position,
    pub tokens: Vec<Token>,
    pub nodes: NodeStacks,
    pub diagnostics: Diagnostics,
}

impl CompileUnit {
    #[must_use]
    pub fn new(file: Option<&str>, flags: u32) -> Self {
        Self {
            flags,
            position: Position::start(file.map(Rc::from)),
            tokens: Vec::new(),
            nodes: NodeStacks::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.position.file.as_deref()
    }

    /// Lex `source` into this unit's token sequence.
    pub fn lex(&mut self, source: impl CharSource) -> Result<(), Error> {
        let lexer = Lexer::new(source, self.position.file.clone());
        let (tokens, warnings) = lexer.lex()?;
        if let Some(last) = tokens.last() {
            self.position = last.position.clone();
        }
        self.tokens = tokens;
        self.diagnostics.extend(warnings);
        Ok(())
    }

    /// Parse the token sequence into this unit's node stacks.
    pub fn parse(&mut self) -> Result<(), Error> {
        self.nodes = parse(&self.tokens)?;
        Ok(())
    }

    /// Lex then parse, recording a fatal error in the diagnostics.
    pub fn run(&mut self, source: impl CharSource) -> CompileStatus {
        match self.lex(source).and_then(|()| self.parse()) {
            Ok(()) => CompileStatus::CompiledOk,
            Err(err) => {
                self.diagnostics.error(err.position().clone(), err.message());
                CompileStatus::FailedWithErrors
            }
        }
    }
}

/// Lex and parse an in-memory source in one step.
pub fn compile_str(input: &str, file: Option<&str>) -> Result<CompileUnit, Error> {
    let mut unit = CompileUnit::new(file, 0);
    unit.lex(StrSource::new(input))?;
    unit.parse()?;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::formatter::format_roots;

    #[test]
    fn compile_records_roots() {
        let unit = compile_str("x = 0x10 + 1", Some("t.c")).expect("compile");
        assert_eq!(unit.file(), Some("t.c"));
        assert_eq!(format_roots(&unit.nodes), ["(x = (16 + 1))"]);
        assert!(unit.diagnostics.is_empty());
    }

    #[test]
    fn run_reports_lex_error() {
        let mut unit = CompileUnit::new(Some("bad.c"), 0);
        let status = unit.run(StrSource::new("a $ b"));
        assert_eq!(status, CompileStatus::FailedWithErrors);
        let diag = unit.diagnostics.iter().next().expect("one diagnostic");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.to_string(), "bad.c:1:3: error: unexpected character: '$'");
    }

    #[test]
    fn run_keeps_warnings() {
        let mut unit = CompileUnit::new(None, 0);
        let status = unit.run(StrSource::new("0x + 1"));
        assert_eq!(status, CompileStatus::CompiledOk);
        assert_eq!(unit.diagnostics.len(), 1);
    }

    #[test]
    fn position_tracks_last_token() {
        let unit = compile_str("a\nbc", None).expect("compile");
        assert_eq!((unit.position.line, unit.position.column), (2, 3));
    }
}
