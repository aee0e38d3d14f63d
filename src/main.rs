//! chaindb-inspect entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors go to stderr
//! and the process exits non-zero. Configuration, the store and the
//! runtime are all owned by the CLI module.

use chaindb_inspect::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
