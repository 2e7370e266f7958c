//! `vtree-patch`: apply an edit script to a JsonML document and print HTML.
//!
//! Usage:
//!   vtree-patch [--pretty] [-v] '<script-json>'
//!
//! The document is read from stdin. The edit script is the first argument.

use std::io::{self, Read, Write};

use vtree::cli::{init_tracing, parse_args, patch_document, CliError};

fn run() -> Result<String, CliError> {
    let (options, args) = parse_args(std::env::args().skip(1))?;
    init_tracing(options.verbose);
    let Some(script) = args.first() else {
        return Err(CliError::Usage(
            "First argument must be an edit script (JSON array).".into(),
        ));
    };

    let mut document = String::new();
    io::stdin()
        .read_to_string(&mut document)
        .map_err(|source| CliError::Io {
            path: "<stdin>".into(),
            source,
        })?;
    patch_document(document.trim(), script, &options)
}

fn main() {
    match run() {
        Ok(html) => {
            let mut out = io::stdout().lock();
            if let Err(e) = writeln!(out, "{html}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
