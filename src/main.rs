//! CLI tool to lex and parse C-like source files.

use std::fs;
use std::process::ExitCode;

use scratchc::{CompileStatus, CompileUnit, StrSource, TokenKind, format_roots};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: scratchc <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  tokens  Print the token stream of each file");
        eprintln!("  ast     Print each top-level expression, fully parenthesised");
        eprintln!("  check   Lex and parse, reporting only errors");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  scratchc tokens test.c");
        eprintln!("  scratchc ast test.c");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    if !matches!(command, "tokens" | "ast" | "check") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }

    let files = &args[2..];
    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        let mut unit = CompileUnit::new(Some(path.as_str()), 0);
        let status = unit.run(StrSource::new(&content));
        for diagnostic in unit.diagnostics.iter() {
            eprintln!("{diagnostic}");
        }
        if status == CompileStatus::FailedWithErrors {
            had_error = true;
            continue;
        }

        match command {
            "tokens" => {
                for token in &unit.tokens {
                    let kind = format!("{:?}", token.kind);
                    let shown = if token.kind == TokenKind::Newline {
                        String::new()
                    } else {
                        token.to_string()
                    };
                    println!(
                        "{}:{}\t{kind}\t{shown}",
                        token.position.line, token.position.column
                    );
                }
            }
            "ast" => {
                for line in format_roots(&unit.nodes) {
                    println!("{line}");
                }
            }
            _ => {
                eprintln!(
                    "{path}: ok ({} token(s), {} expression(s))",
                    unit.tokens.len(),
                    unit.nodes.roots().len()
                );
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
