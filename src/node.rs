//! Syntax tree nodes and the working/root stack pair used to build them.
//!
//! Nodes live in an index arena owned by [`NodeStacks`]. A parent holds
//! its children as [`NodeId`]s; back-references in [`Binding`] are plain
//! ids resolved through the arena and never own anything.

use std::ops::BitOr;

use crate::token::Position;

/// Handle to a node in a [`NodeStacks`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Expression,
    ParenthesizedExpression,
    Number,
    Identifier,
    String,
    Variable,
    VariableList,
    Function,
    Body,
    Return,
    If,
    Else,
    While,
    DoWhile,
    For,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Goto,
    Unary,
    Ternary,
    Label,
    Struct,
    Union,
    Bracket,
    Cast,
    Blank,
}

/// Bitset of node flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const NONE: Self = Self(0);
    pub const INSIDE_EXPRESSION: Self = Self(0b0000_0001);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for NodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Non-owning links to the enclosing body and function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Binding {
    pub owner: Option<NodeId>,
    pub function: Option<NodeId>,
}

/// Payload of a node, one variant per shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Number(u64),
    Identifier(String),
    String(String),
    Expression {
        left: NodeId,
        right: NodeId,
        op: String,
    },
    Parenthesized(NodeId),
    Bracket(NodeId),
    Ternary {
        true_branch: NodeId,
        false_branch: NodeId,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    pub position: Position,
    pub binding: Binding,
    pub value: NodeValue,
}

impl Node {
    fn new(kind: NodeKind, value: NodeValue, position: Position) -> Self {
        Self {
            kind,
            flags: NodeFlags::NONE,
            position,
            binding: Binding::default(),
            value,
        }
    }

    #[must_use]
    pub fn number(value: u64, position: Position) -> Self {
        Self::new(NodeKind::Number, NodeValue::Number(value), position)
    }

    #[must_use]
    pub fn identifier(name: impl Into<String>, position: Position) -> Self {
        Self::new(
            NodeKind::Identifier,
            NodeValue::Identifier(name.into()),
            position,
        )
    }

    #[must_use]
    pub fn string(text: impl Into<String>, position: Position) -> Self {
        Self::new(NodeKind::String, NodeValue::String(text.into()), position)
    }

    #[must_use]
    pub fn expression(
        left: NodeId,
        right: NodeId,
        op: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::new(
            NodeKind::Expression,
            NodeValue::Expression {
                left,
                right,
                op: op.into(),
            },
            position,
        )
    }

    #[must_use]
    pub fn parenthesized(inner: NodeId, position: Position) -> Self {
        Self::new(
            NodeKind::ParenthesizedExpression,
            NodeValue::Parenthesized(inner),
            position,
        )
    }

    #[must_use]
    pub fn bracket(inner: NodeId, position: Position) -> Self {
        Self::new(NodeKind::Bracket, NodeValue::Bracket(inner), position)
    }

    #[must_use]
    pub fn ternary(true_branch: NodeId, false_branch: NodeId, position: Position) -> Self {
        Self::new(
            NodeKind::Ternary,
            NodeValue::Ternary {
                true_branch,
                false_branch,
            },
            position,
        )
    }

    #[must_use]
    pub fn blank(position: Position) -> Self {
        Self::new(NodeKind::Blank, NodeValue::None, position)
    }

    /// Whether this node can serve as an operand.
    #[must_use]
    pub const fn is_expressionable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Expression
                | NodeKind::ParenthesizedExpression
                | NodeKind::Number
                | NodeKind::Identifier
                | NodeKind::String
                | NodeKind::Unary
                | NodeKind::Ternary
                | NodeKind::Bracket
                | NodeKind::Cast
        )
    }

    /// Operator of an expression node.
    #[must_use]
    pub fn operator(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Expression { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Direct children in left-to-right order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self.value {
            NodeValue::Expression { left, right, .. } => vec![left, right],
            NodeValue::Ternary {
                true_branch,
                false_branch,
            } => vec![true_branch, false_branch],
            NodeValue::Parenthesized(inner) | NodeValue::Bracket(inner) => vec![inner],
            _ => Vec::new(),
        }
    }
}

/// Node arena plus the working stack and the root sequence.
///
/// Every live node sits on the working stack until a parent consumes
/// it. The root sequence records top-level nodes; popping a node that is
/// also the last root removes it there as well so a root never refers to
/// a node that has since become somebody's child.
#[derive(Debug, Clone, Default)]
pub struct NodeStacks {
    nodes: Vec<Node>,
    working: Vec<NodeId>,
    roots: Vec<NodeId>,
}

impl NodeStacks {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            working: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Store a node without putting it on the working stack.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Store a node and push it onto the working stack.
    pub fn create(&mut self, node: Node) -> NodeId {
        let id = self.alloc(node);
        self.push(id);
        id
    }

    pub fn push(&mut self, id: NodeId) {
        self.working.push(id);
    }

    #[must_use]
    pub fn peek(&self) -> Option<NodeId> {
        self.working.last().copied()
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        let id = self.working.pop()?;
        if self.roots.last() == Some(&id) {
            self.roots.pop();
        }
        Some(id)
    }

    /// Pop right then left and push `(left op right)` in their place.
    pub fn make_expression(&mut self, op: &str, position: Position) -> Option<NodeId> {
        let right = self.pop()?;
        let Some(left) = self.pop() else {
            self.push(right);
            return None;
        };
        Some(self.create(Node::expression(left, right, op, position)))
    }

    pub fn record_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different arena.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Follow a back-reference.
    #[must_use]
    pub fn resolve(&self, link: Option<NodeId>) -> Option<&Node> {
        link.and_then(|id| self.nodes.get(id.0))
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub fn working(&self) -> &[NodeId] {
        &self.working
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in source order.
    pub fn root_nodes(&self) -> impl Iterator<Item = &Node> {
        self.roots.iter().map(|&id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::default()
    }

    #[test]
    fn pop_removes_matching_root() {
        let mut stacks = NodeStacks::new();
        let a = stacks.create(Node::identifier("a", pos()));
        stacks.record_root(a);
        assert_eq!(stacks.roots(), [a]);

        assert_eq!(stacks.pop(), Some(a));
        assert!(stacks.roots().is_empty());
        assert!(stacks.working().is_empty());
    }

    #[test]
    fn pop_keeps_unrelated_root() {
        let mut stacks = NodeStacks::new();
        let a = stacks.create(Node::identifier("a", pos()));
        stacks.record_root(a);
        let b = stacks.create(Node::identifier("b", pos()));

        assert_eq!(stacks.pop(), Some(b));
        assert_eq!(stacks.roots(), [a]);
    }

    #[test]
    fn make_expression_consumes_two() {
        let mut stacks = NodeStacks::new();
        let a = stacks.create(Node::number(1, pos()));
        let b = stacks.create(Node::number(2, pos()));
        let exp = stacks.make_expression("+", pos()).expect("two operands");

        assert_eq!(stacks.working(), [exp]);
        let node = stacks.get(exp);
        assert_eq!(node.kind, NodeKind::Expression);
        assert_eq!(node.operator(), Some("+"));
        assert_eq!(node.children(), [a, b]);
    }

    #[test]
    fn make_expression_needs_two_operands() {
        let mut stacks = NodeStacks::new();
        let a = stacks.create(Node::number(1, pos()));
        assert!(stacks.make_expression("+", pos()).is_none());
        assert_eq!(stacks.working(), [a]);
    }

    #[test]
    fn arena_counts_unstacked_nodes() {
        let mut stacks = NodeStacks::new();
        assert!(stacks.is_empty());
        stacks.create(Node::number(1, pos()));
        stacks.alloc(Node::blank(pos()));
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks.working().len(), 1);
    }

    #[test]
    fn flags() {
        let mut flags = NodeFlags::NONE;
        assert!(!flags.contains(NodeFlags::INSIDE_EXPRESSION));
        flags.insert(NodeFlags::INSIDE_EXPRESSION);
        assert!(flags.contains(NodeFlags::INSIDE_EXPRESSION));
        assert_eq!((NodeFlags::NONE | NodeFlags::INSIDE_EXPRESSION).bits(), 1);
    }

    #[test]
    fn binding_resolves_through_arena() {
        let mut stacks = NodeStacks::new();
        let body = stacks.alloc(Node::blank(pos()));
        let mut leaf = Node::identifier("x", pos());
        leaf.binding.owner = Some(body);
        let leaf = stacks.alloc(leaf);

        let owner = stacks.resolve(stacks.get(leaf).binding.owner);
        assert_eq!(owner.map(|n| n.kind), Some(NodeKind::Blank));
        assert!(stacks.resolve(stacks.get(leaf).binding.function).is_none());
    }
}
