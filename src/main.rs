//! squatlog CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, and exits non-zero
//! with the error on stderr if the command fails.

use squatlog::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
