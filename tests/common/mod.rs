#![allow(dead_code)]

use scratchc::{TokenKind, format_roots, parse_str, tokenize};

/// Token kinds of `input`, in order.
pub fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .expect("tokenize failed")
        .iter()
        .map(|t| t.kind)
        .collect()
}

/// Display text of each token of `input`.
pub fn texts(input: &str) -> Vec<String> {
    tokenize(input)
        .expect("tokenize failed")
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Fully parenthesised rendering of every root, joined with `; `.
pub fn shape(input: &str) -> String {
    let nodes = parse_str(input).unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"));
    format_roots(&nodes).join("; ")
}

/// Assert that `input` parses to exactly `expected`.
pub fn assert_shape(input: &str, expected: &str) {
    let got = shape(input);
    assert_eq!(
        got, expected,
        "tree mismatch for {input:?}:\n--- expected ---\n{expected}\n--- got ---\n{got}"
    );
}
