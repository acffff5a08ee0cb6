//! Rego parser CLI.

use std::path::Path;

use regoc::commands::{lex_file, parse_files, parse_options};

fn main() {
    regoc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "parse" => {
            let cmd = match parse_options(&args[2..]) {
                Ok(cmd) => cmd,
                Err(err) => {
                    eprintln!("error: {err}");
                    eprintln!("Usage: rego parse [options] <file.rego>...");
                    std::process::exit(1);
                }
            };

            let reports = parse_files(&cmd);
            let mut failed = false;
            for report in &reports {
                print!("{}", report.render());
                failed |= report.has_errors();
            }
            if failed {
                std::process::exit(1);
            }
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: rego lex <file.rego>");
                std::process::exit(1);
            }
            match lex_file(Path::new(&args[2])) {
                Ok(listing) => print!("{listing}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("rego {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Rego policy parser");
    println!();
    println!("Usage: rego <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file.rego>...  Parse files and list their statements");
    println!("  lex <file.rego>       Tokenize a file and display tokens");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Parse options:");
    println!("  --v0                  Accept Rego v0 syntax");
    println!("  --v0v1                Accept v0 syntax that is also valid v1");
    println!("  --future <kw>         Reserve a future keyword (repeatable)");
    println!("  --all-future          Reserve every future keyword");
    println!("  --capabilities <file> Load a capabilities JSON document");
    println!("  --annotations         Decode METADATA comment blocks");
    println!("  --skip-rules          Parse queries only, never rules");
    println!("  --max-depth <n>       Nesting ceiling (0 disables it)");
    println!();
    println!("Logging:");
    println!("  RUST_LOG=rego_parse=debug rego parse policy.rego");
    println!();
    println!("Examples:");
    println!("  rego parse policy.rego");
    println!("  rego parse --v0 --future in legacy.rego");
    println!("  rego parse --annotations policies/*.rego");
    println!("  rego lex policy.rego");
}
