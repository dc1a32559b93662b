#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use clap::Parser;
use pqcheck::SchemeRegistry;
use pqcheck::cli::{Cli, execute};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = pqcheck::logging::init_tracing() {
        eprintln!("warning: logging disabled: {err}");
    }

    let registry = SchemeRegistry::with_builtin();
    match execute(&cli, &registry, io::stdout().lock(), &mut io::stderr()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
