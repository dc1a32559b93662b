#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Random number generation for test harnesses.
//!
//! The only generator here is [`surf::SurfRng`], a fixed-seed stream that
//! reproduces published SURF KAT transcripts byte for byte.

pub mod surf;
