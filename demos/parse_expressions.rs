//! Show how precedence and associativity shape parsed trees.

use scratchc::{format_roots, parse_str};

fn main() {
    let inputs = [
        "a - b - c",
        "a + b * c",
        "a = b = c",
        "p->next.value << 2 | mask",
        "ok ? f(x, y) : table[i + 1]",
    ];

    for input in inputs {
        match parse_str(input) {
            Ok(nodes) => println!("{input:<30} => {}", format_roots(&nodes).join("; ")),
            Err(e) => println!("{input:<30} => error: {e}"),
        }
    }
}
