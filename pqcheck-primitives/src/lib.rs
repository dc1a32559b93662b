#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # pqcheck Primitives
//!
//! Building blocks shared by the pqcheck conformance harness.
//!
//! ## Modules
//!
//! - **rand::surf**: deterministic, reproducible byte stream for known-answer
//!   tests. Never suitable for production secrets.
//! - **guard**: payload buffers flanked by fixed sentinel regions, used to
//!   detect writes past the declared bounds of a scheme buffer.
//! - **gf2**: bit-packed GF(2) vectors and the systematic syndrome product
//!   used by code-based encryption schemes.
//! - **error**: crate error type.

pub mod error;
pub mod gf2;
pub mod guard;
pub mod rand;

pub use error::{Error, Result};
pub use gf2::{PackedBits, SystematicMatrix, Word, compute_syndrome};
pub use guard::{CANARY, GUARD_LEN, GuardStatus, GuardedBuffer};
pub use crate::rand::surf::SurfRng;
