#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Built-in Scheme Adapters
//!
//! Adapters exposing the FIPS 203 / FIPS 204 implementations through the
//! byte-buffer contract in [`crate::scheme`]. They let the harness validate
//! itself against known-good schemes and serve as templates for wrapping
//! other implementations.
//!
//! - **ml_kem**: ML-KEM-512/768/1024 via the `fips203` crate
//! - **ml_dsa**: ML-DSA-44/65/87 via the `fips204` crate

pub mod ml_dsa;
pub mod ml_kem;

pub use ml_dsa::{MlDsa44, MlDsa65, MlDsa87};
pub use ml_kem::{MlKem512, MlKem768, MlKem1024};

use crate::error::SchemeError;
use crate::scheme::Operation;

pub(crate) fn scheme_failure(operation: Operation) -> impl FnOnce(&'static str) -> SchemeError {
    move |reason| SchemeError::OperationFailed { operation, reason: reason.to_string() }
}

pub(crate) fn to_array<const N: usize>(
    what: &'static str,
    bytes: &[u8],
) -> Result<[u8; N], SchemeError> {
    bytes.try_into().map_err(|_| SchemeError::InvalidLength { what, expected: N, actual: bytes.len() })
}
