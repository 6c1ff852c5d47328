//! Conformance-harness front end for lex-compat
//!
//! Reads a source file and an upstream token dump (JSON, in the shape the
//! upstream lexer's `lex` operation produces) and prints the transformed
//! stream as JSON 4-tuples, ready to diff against reference tokenizer
//! output.
//!
//! Usage:
//!   lex-compat --tokens `<dump.json>` `<source>` [--pretty]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};

use lex_compat::compat::{transform, UpstreamOutput};

fn main() -> ExitCode {
    let matches = Command::new("lex-compat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reshape an upstream token dump into the reference tokenizer's form")
        .arg(
            Arg::new("source")
                .help("Path to the source file the dump was lexed from")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .short('t')
                .help("Path to the upstream token dump (JSON)")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print the output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let source_path = matches.get_one::<String>("source").unwrap();
    let tokens_path = matches.get_one::<PathBuf>("tokens").unwrap();
    let pretty = matches.get_flag("pretty");

    let source = match std::fs::read_to_string(source_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read source {}: {}", source_path, err);
            return ExitCode::FAILURE;
        }
    };

    let dump = match std::fs::read_to_string(tokens_path) {
        Ok(dump) => dump,
        Err(err) => {
            eprintln!("error: cannot read token dump {}: {}", tokens_path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let upstream: UpstreamOutput = match serde_json::from_str(&dump) {
        Ok(upstream) => upstream,
        Err(err) => {
            eprintln!("error: malformed token dump: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let output = match transform(&source, upstream) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: cannot serialize output: {}", err);
            ExitCode::FAILURE
        }
    }
}
