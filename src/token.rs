use std::fmt;
use std::rc::Rc;

/// Source location, taken as a snapshot when a token or node is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: Option<Rc<str>>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Start of a file: line 1, column 1.
    #[must_use]
    pub const fn start(file: Option<Rc<str>>) -> Self {
        Self {
            file,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start(None)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Symbol,
    /// Numeric or character literal.
    Number,
    /// Quoted string or `<...>` header name.
    String,
    Comment,
    Newline,
}

/// Literal payload of a token, selected by its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    /// Symbols and character literals.
    Char(char),
    /// Identifiers, keywords, operators, strings and comment text.
    Text(String),
    Number(u64),
    /// Newlines carry nothing.
    None,
}

/// A single token with its kind, payload, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// Location just past the token's last character.
    pub position: Position,
    /// Whitespace follows this token.
    pub whitespace: bool,
    /// Raw text of the outermost parenthesis group this token sits in.
    pub between_brackets: Option<Rc<str>>,
}

impl Token {
    /// Text payload, if this token carries one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of a number or character literal.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            TokenValue::Char(c) if self.kind == TokenKind::Number => Some(u64::from(c)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text() == Some(keyword)
    }

    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text() == Some(op)
    }

    #[must_use]
    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokenKind::Symbol && self.value == TokenValue::Char(c)
    }

    /// Comments, newlines and the `\` line continuation carry no grammar.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::Newline) || self.is_symbol('\\')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Newline, _) => write!(f, "newline"),
            (TokenKind::Comment, _) => write!(f, "comment"),
            (TokenKind::String, TokenValue::Text(s)) => write!(f, "\"{s}\""),
            (TokenKind::Number, TokenValue::Char(c)) => write!(f, "{c:?}"),
            (_, TokenValue::Char(c)) => write!(f, "{c}"),
            (_, TokenValue::Text(s)) => write!(f, "{s}"),
            (_, TokenValue::Number(n)) => write!(f, "{n}"),
            (_, TokenValue::None) => Ok(()),
        }
    }
}
