//! Demonstrate error handling for invalid input.

fn main() {
    // Binary literal with a non-binary digit
    match scratchc::parse_str("x = 0b102") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(scratchc::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!(
                "  Location: line {}, column {}",
                e.position.line, e.position.column
            );
        }
        Err(scratchc::Error::Parse(e)) => {
            println!("Parse error: {e}");
        }
    }

    println!();

    // Operator with nothing on its right
    match scratchc::parse_str("a + ") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(scratchc::Error::Lex(e)) => {
            println!("Lex error: {e}");
        }
        Err(scratchc::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!(
                "  Location: line {}, column {}",
                e.position.line, e.position.column
            );
        }
    }
}
