//! Static operator precedence table.
//!
//! Group 0 binds tightest. Lookup returns the first group that lists
//! the exact operator string.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

/// Operators sharing one precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorGroup {
    pub operators: &'static [&'static str],
    pub associativity: Associativity,
}

pub static OPERATOR_GROUPS: [OperatorGroup; 14] = [
    group(
        &["++", "--", "()", "[]", "(", "[", ".", "->"],
        Associativity::LeftToRight,
    ),
    group(&["*", "/", "%"], Associativity::LeftToRight),
    group(&["+", "-"], Associativity::LeftToRight),
    group(&["<<", ">>"], Associativity::LeftToRight),
    group(&["<", "<=", ">", ">="], Associativity::LeftToRight),
    group(&["==", "!="], Associativity::LeftToRight),
    group(&["&"], Associativity::LeftToRight),
    group(&["^"], Associativity::LeftToRight),
    group(&["|"], Associativity::LeftToRight),
    group(&["&&"], Associativity::LeftToRight),
    group(&["||"], Associativity::LeftToRight),
    group(&["?", ":"], Associativity::RightToLeft),
    group(
        &[
            "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "^=", "|=",
        ],
        Associativity::RightToLeft,
    ),
    group(&[","], Associativity::LeftToRight),
];

const fn group(
    operators: &'static [&'static str],
    associativity: Associativity,
) -> OperatorGroup {
    OperatorGroup {
        operators,
        associativity,
    }
}

/// Precedence index and group of `op`, or `None` if it is not listed.
#[must_use]
pub fn precedence(op: &str) -> Option<(usize, &'static OperatorGroup)> {
    OPERATOR_GROUPS
        .iter()
        .enumerate()
        .find(|(_, group)| group.operators.contains(&op))
}

/// Whether `left` should take its right neighbour's left operand when
/// `left` sits above an expression built with `right`.
///
/// Right-associative groups never give up their operand; otherwise the
/// tighter or equal binding wins so equal levels group to the left.
#[must_use]
pub fn left_op_has_priority(left: &str, right: &str) -> bool {
    let (Some((left_index, left_group)), Some((right_index, _))) =
        (precedence(left), precedence(right))
    else {
        return false;
    };

    if left_group.associativity == Associativity::RightToLeft {
        return false;
    }

    left_index <= right_index
}
