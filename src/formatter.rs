//! Canonical text rendering of parsed trees.
//!
//! Every binary expression is wrapped in parentheses so the grouping the
//! parser chose is visible: `a-b-c` renders as `((a - b) - c)`.

use crate::node::{NodeId, NodeStacks, NodeValue};

/// Render every root node, in source order.
#[must_use]
pub fn format_roots(stacks: &NodeStacks) -> Vec<String> {
    stacks
        .roots()
        .iter()
        .map(|&id| format_node(stacks, id))
        .collect()
}

/// Render one node and its subtree.
#[must_use]
pub fn format_node(stacks: &NodeStacks, id: NodeId) -> String {
    let mut out = String::new();
    write_node(&mut out, stacks, id);
    out
}

/// Pending output: a subtree still to render or literal text.
enum Piece<'a> {
    Node(NodeId),
    Text(&'a str),
}

fn write_node(out: &mut String, stacks: &NodeStacks, id: NodeId) {
    // explicit stack so long operator chains cannot exhaust the call stack
    let mut pending = vec![Piece::Node(id)];

    while let Some(piece) = pending.pop() {
        let id = match piece {
            Piece::Text(text) => {
                out.push_str(text);
                continue;
            }
            Piece::Node(id) => id,
        };

        // pieces are pushed in reverse of the order they are written
        match &stacks.get(id).value {
            NodeValue::Number(n) => out.push_str(&n.to_string()),
            NodeValue::Identifier(name) => out.push_str(name),
            NodeValue::String(text) => write_string(out, text),
            NodeValue::Expression { left, right, op } => match op.as_str() {
                // calls and indexing read as postfix
                "()" | "[]" => {
                    pending.extend([Piece::Node(*right), Piece::Node(*left)]);
                }
                "?" => pending.extend([
                    Piece::Text(")"),
                    Piece::Node(*right),
                    Piece::Text(" ? "),
                    Piece::Node(*left),
                    Piece::Text("("),
                ]),
                _ => pending.extend([
                    Piece::Text(")"),
                    Piece::Node(*right),
                    Piece::Text(" "),
                    Piece::Text(op),
                    Piece::Text(" "),
                    Piece::Node(*left),
                    Piece::Text("("),
                ]),
            },
            NodeValue::Parenthesized(inner) => {
                if wraps_itself(stacks, *inner) {
                    pending.push(Piece::Node(*inner));
                } else {
                    pending.extend([Piece::Text(")"), Piece::Node(*inner), Piece::Text("(")]);
                }
            }
            NodeValue::Bracket(inner) => {
                pending.extend([Piece::Text("]"), Piece::Node(*inner), Piece::Text("[")]);
            }
            NodeValue::Ternary {
                true_branch,
                false_branch,
            } => pending.extend([
                Piece::Node(*false_branch),
                Piece::Text(" : "),
                Piece::Node(*true_branch),
            ]),
            NodeValue::None => {}
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Binary and conditional expressions already print their own parentheses.
fn wraps_itself(stacks: &NodeStacks, id: NodeId) -> bool {
    stacks
        .get(id)
        .operator()
        .is_some_and(|op| op != "()" && op != "[]")
}
