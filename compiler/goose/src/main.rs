//! Goose CLI
//!
//! Runs goose programs with the tree-walking interpreter.

mod commands;
mod diagnostics;
mod logging;

use std::path::PathBuf;

use commands::{eval_expression, parse_file, run_file, Options};

fn main() {
    let mut options = Options::default();
    let mut positional = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--trace" => options.trace = true,
            "--root" => {
                let Some(dir) = args.next() else {
                    eprintln!("error: --root needs a directory");
                    std::process::exit(1);
                };
                options.root = Some(PathBuf::from(dir));
            }
            _ => {
                if let Some(dir) = arg.strip_prefix("--root=") {
                    options.root = Some(PathBuf::from(dir));
                } else {
                    positional.push(arg);
                }
            }
        }
    }

    let Some(command) = positional.first() else {
        print_usage();
        return;
    };

    logging::init(options.trace);

    let code = match command.as_str() {
        "run" => {
            let Some(path) = positional.get(1) else {
                eprintln!("Usage: goose run <file.goose>");
                std::process::exit(1);
            };
            run_file(path, &options)
        }
        "eval" => {
            let Some(expr) = positional.get(1) else {
                eprintln!("Usage: goose eval <expression>");
                std::process::exit(1);
            };
            eval_expression(expr, &options)
        }
        "parse" => {
            let Some(path) = positional.get(1) else {
                eprintln!("Usage: goose parse <file.goose>");
                std::process::exit(1);
            };
            parse_file(path)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-v" => {
            println!("goose {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            // A bare `.goose` path runs the file.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("goose"))
            {
                run_file(command, &options)
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                1
            }
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    println!("goose - tree-walking interpreter for the goose language");
    println!();
    println!("Usage: goose [options] <command> [args]");
    println!();
    println!("Commands:");
    println!("  run <file.goose>     Run a program");
    println!("  eval <expression>    Evaluate one expression and print the result");
    println!("  parse <file.goose>   Parse a file and print its syntax tree");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --trace              Print an indented evaluation trace to stderr");
    println!("  --root <dir>         Directory holding installed packages (default: $GOOSEROOT)");
    println!();
    println!("Environment:");
    println!("  GOOSE_LOG            Log filter, e.g. goose_eval=debug (falls back to RUST_LOG)");
    println!("  GOOSEROOT            Package directory when --root is not given");
    println!();
    println!("Examples:");
    println!("  goose run main.goose");
    println!("  goose main.goose");
    println!("  goose eval '1 to 10 step 3'");
    println!("  goose --trace run main.goose");
}
