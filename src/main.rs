//! Iconsmith - command-line pixel-art icon editor

use std::process::ExitCode;

use iconsmith::cli;

fn main() -> ExitCode {
    cli::run()
}
