//! Command-line interface for the `pqcheck` binary.
//!
//! Status tokens go to stdout; reports and logs go to stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pqcheck_harness::{ConformanceHarness, HarnessConfig, SchemeRegistry, WriterSink};
use std::io::Write;
use tracing::info;

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "pqcheck", version, about = "Post-quantum KEM and signature conformance harness")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the conformance tests against a scheme
    Run(RunArgs),
    /// List registered scheme identifiers
    List,
}

/// Options for `pqcheck run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scheme identifier (see `pqcheck list`)
    #[arg(long, short, value_name = "ID")]
    pub scheme: String,

    /// Positive-agreement iterations
    #[arg(long, default_value_t = 10)]
    pub agreement_iterations: usize,

    /// Corrupted secret key trials
    #[arg(long, default_value_t = 1)]
    pub invalid_sk_trials: usize,

    /// Corrupted ciphertext trials
    #[arg(long, default_value_t = 10)]
    pub invalid_ct_trials: usize,

    /// Inclusive upper bound of the signature message-length sweep
    #[arg(long, default_value_t = 2048)]
    pub max_message_len: usize,

    /// Issue a second, discarded encapsulation per agreement iteration
    #[arg(long)]
    pub duplicate_encapsulation: bool,

    /// Print DONE lines after each KEM operation
    #[arg(long)]
    pub progress: bool,

    /// Do not print signature vector hex dumps
    #[arg(long)]
    pub no_dump: bool,

    /// Print the run report as JSON on stderr instead of text
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Harness configuration for these arguments.
    #[must_use]
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_agreement_iterations(self.agreement_iterations)
            .with_invalid_secret_key_trials(self.invalid_sk_trials)
            .with_invalid_ciphertext_trials(self.invalid_ct_trials)
            .with_max_message_len(self.max_message_len)
            .with_duplicate_encapsulation(self.duplicate_encapsulation)
            .with_progress_messages(self.progress)
            .with_dump_vectors(!self.no_dump)
    }
}

/// Executes `cli` against `registry`, writing status lines to `out` and the
/// report to `err`. Returns whether every test passed.
///
/// # Errors
///
/// Returns an error for an unknown scheme, an invalid configuration, or a
/// failed write.
pub fn execute<O: Write, E: Write>(
    cli: &Cli,
    registry: &SchemeRegistry,
    out: O,
    err: &mut E,
) -> Result<bool> {
    match &cli.command {
        Command::List => {
            let mut out = out;
            for id in registry.identifiers() {
                writeln!(out, "{id}")?;
            }
            Ok(true)
        }
        Command::Run(args) => {
            let scheme = registry.resolve(&args.scheme)?;
            let mut harness = ConformanceHarness::new(args.harness_config(), WriterSink::new(out))
                .context("invalid harness configuration")?;
            info!(scheme = %args.scheme, "Running conformance tests");

            let report = harness
                .run(&scheme)
                .with_context(|| format!("conformance run for {} aborted", args.scheme))?;

            if args.json {
                writeln!(err, "{}", report.to_json()?)?;
            } else {
                write!(err, "{}", report.render_text())?;
            }
            Ok(report.all_passed())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pqcheck").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults_match_harness_defaults() {
        let cli = parse(&["run", "--scheme", "ml-kem-512"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.harness_config(), HarnessConfig::default());
    }

    #[test]
    fn test_run_flags_map_to_config() {
        let cli = parse(&[
            "run",
            "-s",
            "ml-dsa-44",
            "--agreement-iterations",
            "3",
            "--invalid-ct-trials",
            "0",
            "--max-message-len",
            "64",
            "--duplicate-encapsulation",
            "--progress",
            "--no-dump",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let config = args.harness_config();
        assert_eq!(config.agreement_iterations, 3);
        assert_eq!(config.invalid_ciphertext_trials, 0);
        assert_eq!(config.max_message_len, 64);
        assert!(config.duplicate_encapsulation);
        assert!(config.progress_messages);
        assert!(!config.dump_vectors);
    }

    #[test]
    fn test_run_requires_scheme() {
        assert!(Cli::try_parse_from(["pqcheck", "run"]).is_err());
    }
}
