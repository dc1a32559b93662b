#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # pqcheck Harness
//!
//! Conformance and robustness testing for post-quantum KEM and signature
//! implementations behind one byte-buffer contract.
//!
//! ## Overview
//!
//! A scheme implements [`KemScheme`] or [`SignatureScheme`] and publishes its
//! buffer sizes. The [`ConformanceHarness`] allocates guarded buffers of
//! exactly those sizes, feeds the scheme a deterministic random stream, and
//! checks:
//!
//! - encapsulation and decapsulation agree on the shared secret
//! - a random secret key or ciphertext never reproduces that secret
//! - signed messages open to the original message, for lengths up to 2048
//! - no call writes outside its buffers
//!
//! Progress and verdicts go to a line-oriented [`StatusSink`]; a structured
//! [`RunReport`] is returned for programmatic checks.
//!
//! ## Example
//! ```rust,no_run
//! use pqcheck_harness::{ConformanceHarness, HarnessConfig, MemorySink, SchemeRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemeRegistry::with_builtin();
//! let scheme = registry.resolve("ml-dsa-44")?;
//!
//! let mut harness = ConformanceHarness::new(HarnessConfig::quick(), MemorySink::new())?;
//! let report = harness.run(&scheme)?;
//! println!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod harness;
pub mod output;
pub mod registry;
pub mod report;
pub mod scheme;
pub mod schemes;

pub use error::{ConfigError, FailureKind, HarnessError, RegistryError, Result, SchemeError};
pub use harness::{ConformanceHarness, HarnessConfig, MAX_MESSAGE_LEN_LIMIT};
pub use output::{MemorySink, StatusSink, WriterSink};
pub use registry::{SchemeFactory, SchemeRegistry};
pub use report::{CaseOutcome, Failure, RunReport, RunSummary, TestCase};
pub use scheme::{
    DecapsulationInputs, KemCallConvention, KemScheme, KeySource, Operation, SIGNING_SEED_BYTES, Scheme,
    SchemeKind, SchemeSizes, SignCallConvention, SignatureScheme, SigningInputs,
};

/// Re-export of the primitives crate.
pub use pqcheck_primitives as primitives;
