//! `vtree-diff`: print the edit script between two JsonML documents.
//!
//! Usage:
//!   vtree-diff [--pretty] [-v] <old.json> <new.json>

use std::io::{self, Write};
use std::path::Path;

use vtree::cli::{diff_documents, init_tracing, parse_args, read_document, CliError};

fn run() -> Result<String, CliError> {
    let (options, paths) = parse_args(std::env::args().skip(1))?;
    init_tracing(options.verbose);
    let [old, new] = paths.as_slice() else {
        return Err(CliError::Usage(
            "usage: vtree-diff [--pretty] [-v] <old.json> <new.json>".into(),
        ));
    };
    let old = read_document(Path::new(old))?;
    let new = read_document(Path::new(new))?;
    diff_documents(&old, &new, &options)
}

fn main() {
    match run() {
        Ok(script) => {
            let mut out = io::stdout().lock();
            if let Err(e) = writeln!(out, "{script}") {
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
