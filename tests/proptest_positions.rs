//! Property-based tests with proptest.
//!
//! Generate random token-level sources and check lexer invariants, and
//! random operator chains and check the parser's grouping against
//! independent precedence-climbing and shift/reduce references.

use proptest::prelude::*;
use scratchc::{TokenKind, format_roots, parse_str, tokenize};

// -- Leaf strategies --

const KEYWORDS: &[&str] = &[
    "unsigned", "signed", "char", "short", "int", "long", "float", "double", "void", "struct",
    "union", "static", "return", "include", "sizeof", "if", "else", "while", "for", "do",
    "break", "continue", "switch", "case", "default", "goto", "typedef", "const", "extern",
    "restrict",
];

fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,6}".prop_filter("keywords are not operands", |s| {
        !KEYWORDS.contains(&s.as_str())
    })
}

fn number() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..100_000).prop_map(|n| n.to_string()),
        (0u32..0xffff).prop_map(|n| format!("0x{n:x}")),
        (0u32..64).prop_map(|n| format!("0b{n:b}")),
    ]
}

fn operand() -> impl Strategy<Value = String> {
    prop_oneof![identifier(), number()]
}

/// Left-associative binary operators the lexer produces as one token.
fn binary_operator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "*", "/", "%", "+", "-", "<<", ">>", "<", "<=", ">", ">=", "==", "!=", "&", "^", "|",
        "&&", "||",
    ])
}

fn spacing() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", " ", "  ", "\t", "\n", " // note\n", " /* c */ "])
}

/// A chain `o0 op0 o1 op1 ... on` with random spacing.
fn chain() -> impl Strategy<Value = (Vec<String>, Vec<&'static str>, Vec<&'static str>)> {
    (1usize..7).prop_flat_map(|ops| {
        (
            prop::collection::vec(operand(), ops + 1),
            prop::collection::vec(binary_operator(), ops),
            prop::collection::vec(spacing(), ops * 2),
        )
    })
}

fn render(operands: &[String], ops: &[&str], spaces: &[&str]) -> String {
    let mut out = operands[0].clone();
    for (i, op) in ops.iter().enumerate() {
        out.push_str(spaces[i * 2]);
        out.push_str(op);
        out.push_str(spaces[i * 2 + 1]);
        out.push_str(&operands[i + 1]);
    }
    out
}

fn level(op: &str) -> usize {
    match op {
        "*" | "/" | "%" => 1,
        "+" | "-" => 2,
        "<<" | ">>" => 3,
        "<" | "<=" | ">" | ">=" => 4,
        "==" | "!=" => 5,
        "&" => 6,
        "^" => 7,
        "|" => 8,
        "&&" => 9,
        _ => 10,
    }
}

fn leaf_text(operand: &str) -> String {
    if let Some(hex) = operand.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).unwrap().to_string()
    } else if let Some(bin) = operand.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).unwrap().to_string()
    } else {
        operand.to_string()
    }
}

/// Precedence climbing over the same levels, all left-associative.
fn reference(operands: &[String], ops: &[&str]) -> String {
    fn climb(operands: &[String], ops: &[&str], pos: &mut usize, max_level: usize) -> String {
        let mut left = leaf_text(&operands[*pos]);
        while *pos < ops.len() && level(ops[*pos]) <= max_level {
            let op = ops[*pos];
            *pos += 1;
            let right = climb(operands, ops, pos, level(op) - 1);
            left = format!("({left} {op} {right})");
        }
        left
    }
    let mut pos = 0;
    climb(operands, ops, &mut pos, usize::MAX)
}

// -- Mixed chains: groups, assignment, comma and the conditional --

#[derive(Debug, Clone)]
enum Term {
    Leaf(String),
    Group(Chain),
}

/// `t0 op0 t1 ... tn`, optionally followed by `? then : else`.
#[derive(Debug, Clone)]
struct Chain {
    terms: Vec<Term>,
    ops: Vec<&'static str>,
    branches: Option<Box<(Chain, Chain)>>,
}

fn any_operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        4 => binary_operator(),
        1 => prop::sample::select(vec!["=", "+=", "-=", "*=", ","]),
    ]
}

fn flat_chain(term: BoxedStrategy<Term>) -> impl Strategy<Value = Chain> {
    (1usize..5)
        .prop_flat_map(move |ops| {
            (
                prop::collection::vec(term.clone(), ops + 1),
                prop::collection::vec(any_operator(), ops),
            )
        })
        .prop_map(|(terms, ops)| Chain {
            terms,
            ops,
            branches: None,
        })
}

fn mixed_chain() -> impl Strategy<Value = Chain> {
    let leaf = operand().prop_map(Term::Leaf).boxed();
    flat_chain(leaf.clone()).prop_recursive(3, 32, 4, move |inner| {
        let term = prop_oneof![
            3 => leaf.clone(),
            1 => inner.clone().prop_map(Term::Group),
        ]
        .boxed();
        (flat_chain(term), prop::option::of((inner.clone(), inner))).prop_map(
            |(mut chain, branches)| {
                chain.branches = branches.map(Box::new);
                chain
            },
        )
    })
}

fn render_chain(chain: &Chain, out: &mut String) {
    for (i, term) in chain.terms.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(chain.ops[i - 1]);
            out.push(' ');
        }
        match term {
            Term::Leaf(text) => out.push_str(text),
            Term::Group(inner) => {
                out.push('(');
                render_chain(inner, out);
                out.push(')');
            }
        }
    }
    if let Some(branches) = &chain.branches {
        out.push_str(" ? ");
        render_chain(&branches.0, out);
        out.push_str(" : ");
        render_chain(&branches.1, out);
    }
}

fn mixed_level(op: &str) -> usize {
    match op {
        "?" => 11,
        "=" | "+=" | "-=" | "*=" => 12,
        "," => 13,
        _ => level(op),
    }
}

/// Whether `earlier` groups before a later `op`: assignment and the
/// conditional never give up their right operand.
fn binds_before(earlier: &str, op: &str) -> bool {
    let right_assoc = matches!(mixed_level(earlier), 11 | 12);
    !right_assoc && mixed_level(earlier) <= mixed_level(op)
}

fn term_text(term: &Term) -> String {
    match term {
        Term::Leaf(text) => leaf_text(text),
        // a bracketed expression already shows its own parentheses
        Term::Group(inner) if inner.terms.len() > 1 || inner.branches.is_some() => {
            mixed_reference(inner)
        }
        Term::Group(inner) => format!("({})", mixed_reference(inner)),
    }
}

/// Operator-precedence shift/reduce over the same grouping rules.
fn mixed_reference(chain: &Chain) -> String {
    fn reduce(operands: &mut Vec<String>, ops: &mut Vec<&str>) {
        let op = ops.pop().unwrap();
        let right = operands.pop().unwrap();
        let left = operands.pop().unwrap();
        operands.push(format!("({left} {op} {right})"));
    }

    let ternary = chain
        .branches
        .as_ref()
        .map(|b| ("?", format!("{} : {}", mixed_reference(&b.0), mixed_reference(&b.1))));
    let steps = chain
        .ops
        .iter()
        .copied()
        .zip(chain.terms[1..].iter().map(term_text))
        .chain(ternary);

    let mut operands = vec![term_text(&chain.terms[0])];
    let mut pending: Vec<&str> = Vec::new();
    for (op, right) in steps {
        while pending.last().is_some_and(|&top| binds_before(top, op)) {
            reduce(&mut operands, &mut pending);
        }
        pending.push(op);
        operands.push(right);
    }
    while !pending.is_empty() {
        reduce(&mut operands, &mut pending);
    }
    operands.pop().unwrap()
}

proptest! {
    /// Token positions never move backwards.
    #[test]
    fn positions_are_monotonic((operands, ops, spaces) in chain()) {
        let source = render(&operands, &ops, &spaces);
        let tokens = tokenize(&source).unwrap();
        for pair in tokens.windows(2) {
            let (a, b) = (&pair[0].position, &pair[1].position);
            prop_assert!(
                (a.line, a.column) <= (b.line, b.column),
                "{:?} then {:?} in {:?}", a, b, source
            );
        }
    }

    /// A newline token always lands at column 1 of the next line.
    #[test]
    fn newlines_reset_column((operands, ops, spaces) in chain()) {
        let source = render(&operands, &ops, &spaces);
        let tokens = tokenize(&source).unwrap();
        let mut line = 1;
        for token in tokens.iter().filter(|t| t.kind == TokenKind::Newline) {
            line += 1;
            prop_assert_eq!(token.position.line, line);
            prop_assert_eq!(token.position.column, 1);
        }
    }

    /// The whitespace flag is set exactly when blank space follows.
    #[test]
    fn whitespace_flag_matches_source(operands in prop::collection::vec(operand(), 1..6)) {
        let source = operands.join(" + ");
        let tokens = tokenize(&source).unwrap();
        let last = tokens.len() - 1;
        for (i, token) in tokens.iter().enumerate() {
            prop_assert_eq!(token.whitespace, i != last);
        }
    }

    /// Grouping matches an independent precedence-climbing parser.
    #[test]
    fn trees_match_reference((operands, ops, spaces) in chain()) {
        let source = render(&operands, &ops, &spaces);
        let nodes = parse_str(&source).unwrap();
        prop_assert_eq!(nodes.roots().len(), 1);
        prop_assert_eq!(
            format_roots(&nodes).join(""),
            reference(&operands, &ops),
            "source: {:?}", source
        );
    }

    /// Groups, assignment, comma and `?:` mixed into chains still match
    /// an operator-precedence reference.
    #[test]
    fn mixed_trees_match_reference(chain in mixed_chain()) {
        let mut source = String::new();
        render_chain(&chain, &mut source);
        let nodes = parse_str(&source).unwrap();
        prop_assert_eq!(nodes.roots().len(), 1);
        prop_assert_eq!(
            format_roots(&nodes).join(""),
            mixed_reference(&chain),
            "source: {:?}", source
        );
    }

    /// Assignment chains stay right-leaning.
    #[test]
    fn assignments_lean_right(names in prop::collection::vec(identifier(), 2..6)) {
        let source = names.join(" = ");
        let nodes = parse_str(&source).unwrap();
        let mut expected = names.last().unwrap().clone();
        for name in names.iter().rev().skip(1) {
            expected = format!("({name} = {expected})");
        }
        prop_assert_eq!(format_roots(&nodes).join(""), expected);
    }
}
