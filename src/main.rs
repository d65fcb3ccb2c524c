//! CLI tool to check, format, and dump BAML files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use baml_syntax::{ParseOptions, ParseResult, format, parse_with_options};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "baml-syntax", version, about = "Check, format, and dump BAML files")]
struct Cli {
    /// Log parser progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Deepest allowed nesting of expressions, types and blocks
    #[arg(
        long,
        global = true,
        value_name = "N",
        default_value_t = ParseOptions::DEFAULT_MAX_NESTING_DEPTH
    )]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report diagnostics for each file
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Format file(s) and print to stdout
    Fmt {
        /// Only report whether each file is already formatted
        #[arg(long)]
        check: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the parse result as JSON
    Dump {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Command {
    fn files(&self) -> &[PathBuf] {
        match self {
            Self::Check { files } | Self::Fmt { files, .. } | Self::Dump { files, .. } => files,
        }
    }
}

/// A file that was read and parsed, or the reason it could not be read.
struct Parsed {
    path: PathBuf,
    source: String,
    result: Result<ParseResult, std::io::Error>,
}

fn parse_files(files: &[PathBuf], options: &ParseOptions) -> Vec<Parsed> {
    files
        .par_iter()
        .map(|path| {
            let id = path.display().to_string();
            match fs::read_to_string(path) {
                Ok(source) => Parsed {
                    path: path.clone(),
                    result: Ok(parse_with_options(&source, &id, options)),
                    source,
                },
                Err(err) => Parsed {
                    path: path.clone(),
                    source: String::new(),
                    result: Err(err),
                },
            }
        })
        .collect()
}

fn print_diagnostics(result: &ParseResult) {
    for diag in &result.diagnostics {
        eprintln!(
            "{}:{}:{}: {}: {}",
            result.source_id, diag.span.line, diag.span.column, diag.severity, diag.message
        );
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = ParseOptions::new().max_nesting_depth(cli.max_depth);
    let mut had_error = false;

    for parsed in parse_files(cli.command.files(), &options) {
        let path = parsed.path.display();
        let result = match parsed.result {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match &cli.command {
            Command::Check { .. } => {
                print_diagnostics(&result);
                if result.has_errors() {
                    had_error = true;
                } else {
                    eprintln!("{path}: ok ({} declaration(s))", result.ast.len());
                }
            }
            Command::Fmt { check, .. } => {
                if result.has_errors() {
                    print_diagnostics(&result);
                    had_error = true;
                    continue;
                }
                let formatted = format(&result.ast);
                if !*check {
                    print!("{formatted}");
                } else if formatted == parsed.source {
                    eprintln!("{path}: formatted");
                } else {
                    eprintln!("{path}: not formatted");
                    had_error = true;
                }
            }
            Command::Dump { pretty, .. } => {
                let json = if *pretty {
                    serde_json::to_string_pretty(&result)
                } else {
                    serde_json::to_string(&result)
                };
                match json {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("{path}: {e}");
                        had_error = true;
                    }
                }
                had_error |= result.has_errors();
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
