//! Remodel CLI application entry point.
//!
//! This binary migrates a legacy Ember Data object model - models and
//! mixins - into schema-based resources, traits, and extensions.

use std::process::ExitCode;

use clap::Parser;
use remodel::cli::{Arguments, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();

    match remodel::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitStatus::Error.into()
        }
    }
}
