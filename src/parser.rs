use std::fmt;
use std::mem;

use crate::node::{Node, NodeFlags, NodeId, NodeStacks, NodeValue};
use crate::precedence::left_op_has_priority;
use crate::token::{Position, Token, TokenKind};

/// Deepest nesting of parentheses, brackets and ternary branches accepted.
pub const MAX_NESTING: usize = 256;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Token that cannot start or continue an expression, or EOF.
    UnexpectedToken { found: Option<String> },
    /// Binary operator with no left operand.
    UnboundOperand { operator: String },
    /// Missing `)`, `]` or `:`.
    ExpectedSymbol {
        expected: char,
        found: Option<String>,
    },
    /// Groups nested past [`MAX_NESTING`].
    TooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found: None } => {
                write!(f, "unexpected end of input")
            }
            Self::UnexpectedToken { found: Some(t) } => {
                write!(f, "unexpected token '{t}'")
            }
            Self::UnboundOperand { operator } => {
                write!(f, "operator '{operator}' has no left operand")
            }
            Self::ExpectedSymbol {
                expected,
                found: None,
            } => {
                write!(f, "expected '{expected}'")
            }
            Self::ExpectedSymbol {
                expected,
                found: Some(t),
            } => {
                write!(f, "expected '{expected}', got '{t}'")
            }
            Self::TooDeep { limit } => {
                write!(f, "expression nested more than {limit} levels deep")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

/// Parse a token stream into a node arena with its root sequence.
///
/// # Errors
///
/// Returns `ParseError` on the first token that does not fit an
/// expression; nothing is recovered.
pub fn parse(tokens: &[Token]) -> Result<NodeStacks, ParseError> {
    Parser::new(tokens).parse()
}

/// Context handed down each recursive parse call.
///
/// Passed by value; a callee gets its own copy and never writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct History {
    flags: NodeFlags,
}

impl History {
    /// Fresh snapshot carrying `flags`.
    #[must_use]
    pub const fn down(self, flags: NodeFlags) -> Self {
        Self { flags }
    }

    #[must_use]
    pub const fn flags(self) -> NodeFlags {
        self.flags
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    stacks: NodeStacks,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            stacks: NodeStacks::new(),
        }
    }

    /// Parse every top-level expression, recording each as a root.
    pub fn parse(mut self) -> Result<NodeStacks, ParseError> {
        loop {
            self.skip_ignorable();
            let Some(token) = self.peek() else {
                break;
            };

            // statement terminators between roots
            if token.is_symbol(';') {
                self.pos += 1;
                continue;
            }

            self.parse_expressionable(History::default())?;
            if let Some(node) = self.stacks.peek() {
                self.stacks.record_root(node);
            }
        }

        Ok(self.stacks)
    }

    /// Parse one expressionable unit, leaving its top node on the working
    /// stack.
    ///
    /// Each operator hangs a new expression off the bottom of the unit's
    /// right spine, `(last op right)`, and the spine is then settled by
    /// rotation. The unit's top node keeps its arena slot throughout.
    fn parse_expressionable(&mut self, history: History) -> Result<(), ParseError> {
        self.parse_operand(history)?;
        let Some(mut last) = self
            .stacks
            .peek()
            .filter(|&id| self.stacks.get(id).is_expressionable())
        else {
            return Err(self.unexpected());
        };

        let inside = history.down(history.flags() | NodeFlags::INSIDE_EXPRESSION);
        let mut spine: Vec<NodeId> = Vec::new();

        loop {
            self.skip_ignorable();
            if !self.peek().is_some_and(|t| t.kind == TokenKind::Operator) {
                break;
            }
            let token = self.advance();
            let op = token.text().unwrap_or_default();

            let right = if op == "?" {
                self.parse_ternary(inside, token)?
            } else {
                self.parse_operand(inside)?;
                self.pop_operand()?
            };

            let exp = self
                .stacks
                .alloc(Node::expression(last, right, op, token.position.clone()));
            self.mark_inside(last);
            self.mark_inside(right);

            if let &[.., tail] = spine.as_slice() {
                self.set_right(tail, exp);
                self.mark_inside(exp);
            } else {
                // the unit's lone operand gives way to its first expression
                self.stacks.pop();
                self.stacks.push(exp);
            }
            spine.push(exp);
            self.settle(&mut spine);
            last = right;
        }

        Ok(())
    }

    /// A leaf or parenthesised group, then any calls and indexing on it.
    fn parse_operand(&mut self, history: History) -> Result<(), ParseError> {
        self.skip_ignorable();
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };

        match token.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Identifier => {
                self.parse_leaf(history);
            }
            TokenKind::Operator if token.is_operator("(") => self.parse_parentheses(history)?,
            TokenKind::Operator => {
                return Err(ParseError {
                    kind: ParseErrorKind::UnboundOperand {
                        operator: token.text().unwrap_or_default().to_string(),
                    },
                    position: token.position.clone(),
                });
            }
            _ => return Err(self.unexpected()),
        }

        loop {
            self.skip_ignorable();
            match self.peek() {
                Some(t) if t.is_operator("(") => {
                    let open = self.advance();
                    self.parse_call(history, open)?;
                }
                Some(t) if t.is_operator("[") => {
                    let open = self.advance();
                    self.parse_index(history, open)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_leaf(&mut self, history: History) {
        let token = self.advance();
        let position = token.position.clone();
        let text = token.text().unwrap_or_default();
        let mut node = match token.kind {
            TokenKind::Number => Node::number(token.number().unwrap_or_default(), position),
            TokenKind::String => Node::string(text, position),
            _ => Node::identifier(text, position),
        };
        node.flags = history.flags();
        self.stacks.create(node);
    }

    /// `( expr )` in operand position.
    fn parse_parentheses(&mut self, history: History) -> Result<(), ParseError> {
        let open = self.advance();
        let inner = self.parse_group(history, ')', false, open)?;
        let mut node = Node::parenthesized(inner, open.position.clone());
        node.flags = history.flags();
        self.stacks.create(node);
        Ok(())
    }

    /// `callee ( args )`, the callee already on the working stack.
    fn parse_call(&mut self, history: History, open: &Token) -> Result<(), ParseError> {
        let args = self.parse_group(history, ')', true, open)?;
        self.stacks
            .create(Node::parenthesized(args, open.position.clone()));
        self.combine_top("()", open)
    }

    /// `target [ index ]`, the target already on the working stack.
    fn parse_index(&mut self, history: History, open: &Token) -> Result<(), ParseError> {
        let index = self.parse_group(history, ']', false, open)?;
        self.stacks.create(Node::bracket(index, open.position.clone()));
        self.combine_top("[]", open)
    }

    /// Both branches of `cond ? a : b`; the `?` is already consumed.
    fn parse_ternary(
        &mut self,
        history: History,
        question: &Token,
    ) -> Result<NodeId, ParseError> {
        self.enter(question)?;
        self.parse_expressionable(history)?;
        let true_branch = self.pop_operand()?;
        self.expect_symbol(':')?;
        self.parse_expressionable(history)?;
        let false_branch = self.pop_operand()?;
        self.depth -= 1;

        let ternary = self.stacks.alloc(Node::ternary(
            true_branch,
            false_branch,
            question.position.clone(),
        ));
        Ok(ternary)
    }

    /// Parse the inside of a bracketed group and consume its closer.
    fn parse_group(
        &mut self,
        history: History,
        close: char,
        allow_empty: bool,
        open: &Token,
    ) -> Result<NodeId, ParseError> {
        self.enter(open)?;
        self.skip_ignorable();
        let inner = if allow_empty && self.peek().is_some_and(|t| t.is_symbol(close)) {
            self.stacks.alloc(Node::blank(open.position.clone()))
        } else {
            self.parse_expressionable(history.down(NodeFlags::INSIDE_EXPRESSION))?;
            self.pop_operand()?
        };
        self.expect_symbol(close)?;
        self.depth -= 1;
        Ok(inner)
    }

    /// Step one nesting level down, refusing past [`MAX_NESTING`].
    fn enter(&mut self, opener: &Token) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError {
                kind: ParseErrorKind::TooDeep { limit: MAX_NESTING },
                position: opener.position.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Pop the top two nodes and push them back as one expression.
    fn combine_top(&mut self, op: &str, token: &Token) -> Result<(), ParseError> {
        let exp = self
            .stacks
            .make_expression(op, token.position.clone())
            .ok_or_else(|| ParseError {
                kind: ParseErrorKind::UnboundOperand {
                    operator: op.to_string(),
                },
                position: token.position.clone(),
            })?;
        for child in self.stacks.get(exp).children() {
            self.mark_inside(child);
        }
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<NodeId, ParseError> {
        let id = self.stacks.pop().ok_or_else(|| self.unexpected())?;
        self.mark_inside(id);
        Ok(id)
    }

    fn mark_inside(&mut self, id: NodeId) {
        self.stacks
            .get_mut(id)
            .flags
            .insert(NodeFlags::INSIDE_EXPRESSION);
    }

    fn set_right(&mut self, parent: NodeId, child: NodeId) {
        if let NodeValue::Expression { right, .. } = &mut self.stacks.get_mut(parent).value {
            *right = child;
        }
    }

    /// Rotate the bottom of the right spine upwards while the operator
    /// above takes priority over the one below it.
    ///
    /// Each rotation takes one node off the spine for good, so a whole
    /// unit settles in time linear in its operator count.
    fn settle(&mut self, spine: &mut Vec<NodeId>) {
        while let &[.., parent, child] = spine.as_slice() {
            if !self.takes_priority(parent, child) {
                break;
            }
            self.rotate(parent, child);
            spine.pop();
        }
    }

    fn takes_priority(&self, parent: NodeId, child: NodeId) -> bool {
        match (
            self.stacks.get(parent).operator(),
            self.stacks.get(child).operator(),
        ) {
            (Some(outer), Some(inner)) => left_op_has_priority(outer, inner),
            _ => false,
        }
    }

    /// `(L op1 (M op2 N))` becomes `((L op1 M) op2 N)`.
    ///
    /// The inner node's slot is reused for the new left child, and each
    /// node keeps the position of the operator it now holds.
    fn rotate(&mut self, parent: NodeId, child: NodeId) {
        let outer = mem::replace(&mut self.stacks.get_mut(parent).value, NodeValue::None);
        let inner = mem::replace(&mut self.stacks.get_mut(child).value, NodeValue::None);

        match (outer, inner) {
            (
                NodeValue::Expression { left, op, .. },
                NodeValue::Expression {
                    left: middle,
                    right: far_right,
                    op: inner_op,
                },
            ) => {
                self.stacks.get_mut(child).value = NodeValue::Expression {
                    left,
                    right: middle,
                    op,
                };
                self.stacks.get_mut(parent).value = NodeValue::Expression {
                    left: child,
                    right: far_right,
                    op: inner_op,
                };
                let position = mem::take(&mut self.stacks.get_mut(parent).position);
                let position = mem::replace(&mut self.stacks.get_mut(child).position, position);
                self.stacks.get_mut(parent).position = position;
            }
            (outer, inner) => {
                self.stacks.get_mut(parent).value = outer;
                self.stacks.get_mut(child).value = inner;
            }
        }
    }

    fn expect_symbol(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_ignorable();
        match self.peek() {
            Some(token) if token.is_symbol(expected) => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(ParseError {
                kind: ParseErrorKind::ExpectedSymbol {
                    expected,
                    found: Some(token.to_string()),
                },
                position: token.position.clone(),
            }),
            None => Err(ParseError {
                kind: ParseErrorKind::ExpectedSymbol {
                    expected,
                    found: None,
                },
                position: self.eof_position(),
            }),
        }
    }

    fn unexpected(&self) -> ParseError {
        self.peek().map_or_else(
            || ParseError {
                kind: ParseErrorKind::UnexpectedToken { found: None },
                position: self.eof_position(),
            },
            |token| ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    found: Some(token.to_string()),
                },
                position: token.position.clone(),
            },
        )
    }

    fn skip_ignorable(&mut self) {
        while self.peek().is_some_and(Token::is_ignorable) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Consume the current token. Callers have already peeked it.
    fn advance(&mut self) -> &'a Token {
        let tokens = self.tokens;
        let token = &tokens[self.pos];
        self.pos += 1;
        token
    }

    fn eof_position(&self) -> Position {
        self.tokens
            .last()
            .map_or_else(Position::default, |last| last.position.clone())
    }
}
