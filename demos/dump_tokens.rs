//! Print the token stream of a small source snippet.

use scratchc::tokenize_named;

fn main() {
    let source = "#include <stdio.h>\nx = (0x1F + 0b101) * y; // done\n";
    let tokens = tokenize_named(source, "demo.c").expect("valid source");

    for token in &tokens {
        let ws = if token.whitespace { " (ws)" } else { "" };
        println!(
            "{}\t{:?}\t{token}{ws}",
            token.position, token.kind
        );
        if let Some(group) = &token.between_brackets {
            println!("\t  inside ({group})");
        }
    }
}
