#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! pqcheck - Post-Quantum Conformance Testing
//!
//! Exercises KEM and signature implementations against one behavioural
//! contract: shared-secret agreement, rejection of corrupted secret keys
//! and ciphertexts, exact message recovery across a signature sweep, and
//! detection of writes outside declared buffers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pqcheck::{ConformanceHarness, HarnessConfig, SchemeRegistry, WriterSink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! pqcheck::logging::init_tracing()?;
//!
//! let scheme = SchemeRegistry::with_builtin().resolve("ml-kem-768")?;
//! let mut harness = ConformanceHarness::new(HarnessConfig::default(), WriterSink::stdout())?;
//! let report = harness.run(&scheme)?;
//! eprintln!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing Your Own Scheme
//!
//! Implement [`KemScheme`] or [`SignatureScheme`], register a factory under
//! an identifier, and run it like a built-in:
//!
//! ```rust,ignore
//! let mut registry = SchemeRegistry::with_builtin();
//! registry.register("my-kem", || Scheme::Kem(Box::new(MyKem)))?;
//! ```
//!
//! ## Crates
//!
//! - [`primitives`]: deterministic KAT generator, guarded buffers, GF(2) syndrome
//! - [`harness`]: scheme contract, registry, harness, status channel, reports

pub mod cli;
pub mod logging;

pub use pqcheck_harness as harness;
pub use pqcheck_primitives as primitives;

pub use pqcheck_harness::{
    CaseOutcome, ConformanceHarness, FailureKind, HarnessConfig, HarnessError, KemScheme, MemorySink,
    RunReport, Scheme, SchemeKind, SchemeRegistry, SchemeSizes, SignatureScheme, StatusSink, TestCase,
    WriterSink,
};
pub use pqcheck_primitives::{GuardedBuffer, PackedBits, SurfRng, SystematicMatrix, compute_syndrome};
