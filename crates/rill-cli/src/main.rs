//! Rill CLI - file runner and frontend debugging commands.

use std::process;

mod output;
mod pipeline;

use pipeline::{Format, Options};

fn main() {
    output::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut options = Options::default();
    let mut format = Format::Human;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--all-errors" => options.all_errors = true,
            "--loose-types" => options.strict_types = false,
            "--max-steps" => {
                let value = iter.next().and_then(|v| v.parse::<u64>().ok());
                match value {
                    Some(n) => options.max_steps = Some(n),
                    None => {
                        eprintln!("{}: --max-steps expects a number", output::error_label());
                        process::exit(1);
                    }
                }
            }
            "--format" => match iter.next().as_deref() {
                Some("human") => format = Format::Human,
                Some("json") => format = Format::Json,
                _ => {
                    eprintln!(
                        "{}: --format expects `human` or `json`",
                        output::error_label()
                    );
                    process::exit(1);
                }
            },
            _ => positional.push(arg),
        }
    }

    if positional.is_empty() {
        print_usage();
        process::exit(1);
    }

    match positional[0].as_str() {
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => println!("rill {}", env!("CARGO_PKG_VERSION")),
        "run" => {
            let path = expect_path(&positional, "run");
            pipeline::cmd_run(path, &options, format);
        }
        "check" => {
            let path = expect_path(&positional, "check");
            pipeline::cmd_check(path, &options, format);
        }
        "parse" => {
            let path = expect_path(&positional, "parse");
            cmd_parse(path);
        }
        "lex" => {
            let path = expect_path(&positional, "lex");
            cmd_lex(path);
        }
        other => {
            // Treat a bare filename as `run`.
            if other.ends_with(".rill") {
                pipeline::cmd_run(other, &options, format);
            } else {
                eprintln!("Unknown command: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }
}

fn expect_path<'a>(positional: &'a [String], command: &str) -> &'a str {
    match positional.get(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: rill {} <file.rill>", command);
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Rill {} - a small statically-checked interpreted language", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: rill <command> [options] <file.rill>");
    println!();
    println!("Commands:");
    println!("  run <file>       Type-check and execute a program (default)");
    println!("  check <file>     Type-check without executing");
    println!("  parse <file>     Parse a file and print the AST");
    println!("  lex <file>       Tokenize a file and print tokens");
    println!("  help             Show this help");
    println!("  version          Show version");
    println!();
    println!("Options:");
    println!("  --all-errors     Show all diagnostics instead of the first");
    println!("  --loose-types    Let unannotated values through the checker");
    println!("  --max-steps <n>  Abort execution after n evaluation steps");
    println!("  --format <f>     Output format: human (default) or json");
}

fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: reading {}: {}",
                output::error_label(),
                output::file_path(path),
                e
            );
            process::exit(1);
        }
    }
}

fn cmd_lex(path: &str) {
    let source = read_source(path);
    let mut sources = rill_ast::SourceMap::new();
    let id = sources.add(path, source.clone());

    let result = rill_lexer::Lexer::new(&source, id).tokenize();
    for error in &result.errors {
        use rill_diagnostics::ToDiagnostic;
        eprint!(
            "{}",
            rill_diagnostics::formatter::render(&error.to_diagnostic(), &sources)
        );
    }

    for token in &result.tokens {
        println!("{:4}..{:<4} {:?}", token.span.start, token.span.end, token.kind);
    }

    if result.is_ok() {
        println!("\n{}", output::banner_ok("Lex"));
    } else {
        eprintln!("\n{}", output::banner_fail("Lex", result.errors.len()));
        process::exit(1);
    }
}

fn cmd_parse(path: &str) {
    let source = read_source(path);
    let mut sources = rill_ast::SourceMap::new();
    let id = sources.add(path, source.clone());

    let lexed = rill_lexer::Lexer::new(&source, id).tokenize();
    let result = rill_parser::Parser::new(lexed.tokens).parse();

    if lexed.errors.is_empty() && result.is_ok() {
        println!("{:#?}", result.program);
        println!("\n{}", output::banner_ok("Parse"));
    } else {
        use rill_diagnostics::ToDiagnostic;
        for error in &lexed.errors {
            eprint!(
                "{}",
                rill_diagnostics::formatter::render(&error.to_diagnostic(), &sources)
            );
        }
        for error in &result.errors {
            eprint!(
                "{}",
                rill_diagnostics::formatter::render(&error.to_diagnostic(), &sources)
            );
        }
        let count = lexed.errors.len() + result.errors.len();
        eprintln!("\n{}", output::banner_fail("Parse", count));
        process::exit(1);
    }
}
