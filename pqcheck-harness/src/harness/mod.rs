#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Conformance Harness
//!
//! Drives a [`Scheme`] through its behavioural contract:
//!
//! - **KEM**: positive agreement, then decapsulation with a random secret
//!   key, then decapsulation of a random ciphertext
//! - **Signature**: sign/open sweep over message lengths `0, 1, 2, 4, ...`
//!
//! Every scheme call is bracketed by guard preparation and checking on all
//! buffers it can reach. Randomness comes from a single [`SurfRng`] that
//! lives for the whole harness, so consecutive runs continue one stream.
//!
//! ## Example
//! ```rust,no_run
//! use pqcheck_harness::{ConformanceHarness, HarnessConfig, SchemeRegistry, WriterSink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheme = SchemeRegistry::with_builtin().resolve("ml-kem-768")?;
//! let mut harness = ConformanceHarness::new(HarnessConfig::default(), WriterSink::stdout())?;
//! let report = harness.run(&scheme)?;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

mod config;
mod guarded;
mod kem;
mod signature;

pub use config::{HarnessConfig, MAX_MESSAGE_LEN_LIMIT};

use crate::error::Result;
use crate::output::{self, StatusSink};
use crate::report::RunReport;
use crate::scheme::Scheme;
use kem::KemSession;
use pqcheck_primitives::SurfRng;
use signature::SignatureSession;
use tracing::{info, instrument};

/// Runs conformance tests against schemes, writing tokens to a
/// [`StatusSink`].
#[derive(Debug)]
pub struct ConformanceHarness<S: StatusSink> {
    config: HarnessConfig,
    rng: SurfRng,
    sink: S,
}

impl<S: StatusSink> ConformanceHarness<S> {
    /// Creates a harness with a freshly seeded generator.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: HarnessConfig, sink: S) -> Result<Self> {
        Self::with_rng(config, sink, SurfRng::new())
    }

    /// Creates a harness drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_rng(config: HarnessConfig, sink: S, rng: SurfRng) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng, sink })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Generator state.
    #[must_use]
    pub fn rng(&self) -> &SurfRng {
        &self.rng
    }

    /// Status sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the harness and returns its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs every test applicable to `scheme`.
    ///
    /// Test failures are recorded in the returned report; they do not
    /// produce `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not apply to `scheme`'s
    /// kind, the status sink fails, or a buffer of the declared size cannot
    /// be laid out.
    #[instrument(level = "info", skip(self, scheme), fields(scheme = scheme.name(), kind = %scheme.kind()))]
    pub fn run(&mut self, scheme: &Scheme) -> Result<RunReport> {
        self.config.validate_for(scheme.kind())?;
        let mut report = RunReport::new(scheme.name(), scheme.kind());
        info!(sizes = ?scheme.sizes(), "Starting conformance run");
        self.sink.emit(output::START_MARKER)?;

        match scheme {
            Scheme::Kem(kem) => {
                KemSession::new(kem.as_ref(), &self.config, &mut self.rng, &mut self.sink)?
                    .run(&mut report)?;
            }
            Scheme::Signature(sig) => {
                SignatureSession::new(sig.as_ref(), &self.config, &mut self.rng, &mut self.sink)?
                    .run(&mut report)?;
            }
        }

        self.sink.emit(output::COMPLETION_MARKER)?;
        let summary = report.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            halted = report.halted,
            "Conformance run finished"
        );
        Ok(report)
    }
}
