use std::fmt;
use std::rc::Rc;

use crate::diagnostics::Diagnostics;
use crate::source::{CharSource, StrSource};
use crate::token::{Position, Token, TokenKind, TokenValue};

const KEYWORDS: &[&str] = &[
    "unsigned",
    "signed",
    "char",
    "short",
    "int",
    "long",
    "float",
    "double",
    "void",
    "struct",
    "union",
    "static",
    "__ignore_typecheck",
    "return",
    "include",
    "sizeof",
    "if",
    "else",
    "while",
    "for",
    "do",
    "break",
    "continue",
    "switch",
    "case",
    "default",
    "goto",
    "typedef",
    "const",
    "extern",
    "restrict",
];

const VALID_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "!", "^", "+=", "-=", "*=", "/=", ">>", "<<", ">=", "<=", ">", "<", "||",
    "&&", "|", "&", "++", "--", "=", "!=", "==", "->", "(", "[", ",", ".", "...", "~", "?", "%",
];

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
    /// Operator outside the valid operator set.
    InvalidOperator(String),
    /// Non-binary digit in a `0b` literal.
    InvalidBinaryDigit(char),
    /// `/*` without a closing `*/`.
    UnterminatedComment,
    /// Character literal without its closing quote.
    UnterminatedQuote,
    /// String or header name that runs into end of input.
    UnterminatedString,
    /// `)` without a matching `(`.
    UnbalancedParens,
    /// Literal does not fit in 64 bits.
    NumberTooLarge(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
            Self::InvalidOperator(op) => {
                write!(f, "the operator {op} is not valid")
            }
            Self::InvalidBinaryDigit(ch) => {
                write!(f, "not a valid binary digit: {ch}")
            }
            Self::UnterminatedComment => {
                write!(f, "multiline comment not closed")
            }
            Self::UnterminatedQuote => {
                write!(f, "opened quote not closed")
            }
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnbalancedParens => {
                write!(f, "closed an expression that was never opened")
            }
            Self::NumberTooLarge(digits) => {
                write!(f, "number literal too large: {digits}")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

/// Tokenize a source string with no file name attached.
///
/// # Errors
///
/// Returns `LexError` on the first character sequence that is not
/// a valid token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(StrSource::new(input), None)
        .lex()
        .map(|(tokens, _)| tokens)
}

/// Tokenize a source string, stamping `file` on every position.
///
/// # Errors
///
/// Returns `LexError` under the same conditions as [`tokenize`]; its
/// position carries `file`.
pub fn tokenize_named(input: &str, file: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(StrSource::new(input), Some(Rc::from(file)))
        .lex()
        .map(|(tokens, _)| tokens)
}

/// Raw text recorded while a parenthesis group is open.
struct Capture {
    text: String,
    /// Index of the first token lexed inside the group.
    first_token: usize,
}

/// Character-driven lexer over any [`CharSource`].
pub struct Lexer<S> {
    source: S,
    pos: Position,
    tokens: Vec<Token>,
    depth: usize,
    capture: Option<Capture>,
    warnings: Diagnostics,
}

impl<S: CharSource> Lexer<S> {
    pub const fn new(source: S, file: Option<Rc<str>>) -> Self {
        Self {
            source,
            pos: Position::start(file),
            tokens: Vec::new(),
            depth: 0,
            capture: None,
            warnings: Diagnostics::new(),
        }
    }

    /// Run to end of input, returning the tokens and any warnings.
    pub fn lex(mut self) -> Result<(Vec<Token>, Diagnostics), LexError> {
        while self.step()? {}
        Ok(self.finish())
    }

    /// Lex the next token. Returns `false` once input is exhausted.
    pub fn step(&mut self) -> Result<bool, LexError> {
        let Some(c) = self.source.peek() else {
            return Ok(false);
        };

        match c {
            '/' => self.read_comment_or_division()?,
            '0'..='9' => self.read_number()?,
            'x' | 'b' if self.follows_zero() => self.read_special_number()?,
            '<' if self.follows_include() => self.read_string('<', '>')?,
            '+' | '-' | '*' | '>' | '<' | '^' | '%' | '!' | '=' | '~' | '|' | '&' | '(' | '['
            | ',' | '.' | '?' => self.read_operator()?,
            '{' | '}' | '#' | ':' | ';' | ']' | ')' | '\\' => self.read_symbol()?,
            '"' => self.read_string('"', '"')?,
            '\'' => self.read_char_literal()?,
            ' ' | '\t' | '\r' => {
                self.next_char();
                if let Some(last) = self.tokens.last_mut() {
                    last.whitespace = true;
                }
            }
            '\n' => {
                self.next_char();
                self.push_token(TokenKind::Newline, TokenValue::None);
            }
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(),
            c => return Err(self.error(LexErrorKind::UnexpectedCharacter(c))),
        }

        Ok(true)
    }

    /// Number of currently open parenthesis groups.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Freeze any unclosed capture and hand back the results.
    pub fn finish(mut self) -> (Vec<Token>, Diagnostics) {
        self.freeze_capture();
        (self.tokens, self.warnings)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.source.peek()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.source.next()?;
        if let Some(capture) = &mut self.capture {
            capture.text.push(c);
        }
        self.pos.column += 1;
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        }
        Some(c)
    }

    fn push_char(&mut self, c: char) {
        self.source.push_back(c);
        if let Some(capture) = &mut self.capture {
            capture.text.pop();
        }
        self.pos.column = self.pos.column.saturating_sub(1).max(1);
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            position: self.pos.clone(),
        }
    }

    fn push_token(&mut self, kind: TokenKind, value: TokenValue) {
        self.tokens.push(Token {
            kind,
            value,
            position: self.pos.clone(),
            whitespace: false,
            between_brackets: None,
        });
    }

    fn follows_zero(&self) -> bool {
        self.tokens.last().is_some_and(|last| {
            last.kind == TokenKind::Number
                && last.value == TokenValue::Number(0)
                && !last.whitespace
        })
    }

    fn follows_include(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|last| last.is_keyword("include"))
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_char().filter(|&c| accept(c)) {
            out.push(c);
            self.next_char();
        }
        out
    }

    fn read_comment_or_division(&mut self) -> Result<(), LexError> {
        self.next_char(); // consume '/'
        match self.peek_char() {
            Some('/') => {
                self.next_char();
                let text = self.read_while(|c| c != '\n');
                self.push_token(TokenKind::Comment, TokenValue::Text(text));
            }
            Some('*') => {
                self.next_char();
                let mut text = String::new();
                loop {
                    match self.next_char() {
                        None => return Err(self.error(LexErrorKind::UnterminatedComment)),
                        Some('*') => {
                            if self.peek_char() == Some('/') {
                                self.next_char();
                                break;
                            }
                            text.push('*');
                        }
                        Some(c) => text.push(c),
                    }
                }
                self.push_token(TokenKind::Comment, TokenValue::Text(text));
            }
            _ => {
                self.push_char('/');
                self.read_operator()?;
            }
        }
        Ok(())
    }

    fn read_number(&mut self) -> Result<(), LexError> {
        let digits = self.read_while(|c| c.is_ascii_digit());
        let value = self.parse_number(&digits, 10)?;
        self.push_token(TokenKind::Number, TokenValue::Number(value));
        Ok(())
    }

    fn parse_number(&self, digits: &str, radix: u32) -> Result<u64, LexError> {
        if digits.is_empty() {
            return Ok(0);
        }
        u64::from_str_radix(digits, radix)
            .map_err(|_| self.error(LexErrorKind::NumberTooLarge(digits.to_string())))
    }

    /// `0x..` / `0b..`: the `0` already lexed as a number is replaced.
    fn read_special_number(&mut self) -> Result<(), LexError> {
        self.tokens.pop();
        let value = if self.next_char() == Some('x') {
            let digits = self.read_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                self.warnings
                    .warning(self.pos.clone(), "hexadecimal literal has no digits");
            }
            self.parse_number(&digits, 16)?
        } else {
            let digits = self.read_while(|c| c.is_ascii_digit());
            if let Some(bad) = digits.chars().find(|&c| c != '0' && c != '1') {
                return Err(self.error(LexErrorKind::InvalidBinaryDigit(bad)));
            }
            if digits.is_empty() {
                self.warnings
                    .warning(self.pos.clone(), "binary literal has no digits");
            }
            self.parse_number(&digits, 2)?
        };
        self.push_token(TokenKind::Number, TokenValue::Number(value));
        Ok(())
    }

    fn read_operator(&mut self) -> Result<(), LexError> {
        let Some(first) = self.next_char() else {
            return Ok(());
        };
        let mut op = String::from(first);

        if !is_always_single(first) {
            if let Some(second) = self.peek_char().filter(|&c| is_single_operator(c)) {
                self.next_char();
                op.push(second);
                if !is_valid_operator(&op) {
                    self.push_char(second);
                    op.pop();
                }
            }
        }

        if !is_valid_operator(&op) {
            return Err(self.error(LexErrorKind::InvalidOperator(op)));
        }

        self.push_token(TokenKind::Operator, TokenValue::Text(op));
        if first == '(' {
            self.open_group();
        }
        Ok(())
    }

    fn read_symbol(&mut self) -> Result<(), LexError> {
        let Some(c) = self.next_char() else {
            return Ok(());
        };
        if c == ')' {
            self.close_group()?;
        }
        self.push_token(TokenKind::Symbol, TokenValue::Char(c));
        Ok(())
    }

    fn open_group(&mut self) {
        self.depth += 1;
        if self.depth == 1 {
            self.capture = Some(Capture {
                text: String::new(),
                first_token: self.tokens.len(),
            });
        }
    }

    fn close_group(&mut self) -> Result<(), LexError> {
        if self.depth == 0 {
            return Err(self.error(LexErrorKind::UnbalancedParens));
        }
        self.depth -= 1;
        if self.depth == 0 {
            // the closing ')' itself is not part of the group
            if let Some(capture) = &mut self.capture {
                capture.text.pop();
            }
            self.freeze_capture();
        }
        Ok(())
    }

    fn freeze_capture(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        let text: Rc<str> = Rc::from(capture.text);
        let first = capture.first_token.min(self.tokens.len());
        for token in &mut self.tokens[first..] {
            token.between_brackets = Some(Rc::clone(&text));
        }
    }

    fn read_string(&mut self, start: char, end: char) -> Result<(), LexError> {
        let opened = self.next_char();
        debug_assert_eq!(opened, Some(start));

        let mut text = String::new();
        loop {
            match self.next_char() {
                None => return Err(self.error(LexErrorKind::UnterminatedString)),
                Some(c) if c == end => break,
                Some('\\') if end == '"' => match self.next_char() {
                    Some(escaped) => text.push(escape(escaped)),
                    None => return Err(self.error(LexErrorKind::UnterminatedString)),
                },
                Some(c) => text.push(c),
            }
        }

        self.push_token(TokenKind::String, TokenValue::Text(text));
        Ok(())
    }

    fn read_char_literal(&mut self) -> Result<(), LexError> {
        self.next_char(); // opening quote
        let c = match self.next_char() {
            Some('\\') => self.next_char().map(escape),
            other => other,
        };
        let Some(c) = c else {
            return Err(self.error(LexErrorKind::UnterminatedQuote));
        };
        if self.peek_char() != Some('\'') {
            return Err(self.error(LexErrorKind::UnterminatedQuote));
        }
        self.next_char();
        self.push_token(TokenKind::Number, TokenValue::Char(c));
        Ok(())
    }

    fn read_word(&mut self) {
        let word = self.read_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = if KEYWORDS.contains(&word.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push_token(kind, TokenValue::Text(word));
    }
}

const fn is_always_single(c: char) -> bool {
    matches!(c, '(' | '[' | ',' | '*' | '.' | '?')
}

const fn is_single_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-'
            | '/'
            | '*'
            | '='
            | '>'
            | '<'
            | '|'
            | '&'
            | '^'
            | '%'
            | '~'
            | '!'
            | '('
            | '['
            | ','
            | '.'
            | '?'
    )
}

fn is_valid_operator(op: &str) -> bool {
    VALID_OPERATORS.contains(&op)
}

const fn escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    }
}
