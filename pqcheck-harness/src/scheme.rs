#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Scheme Capability Contract
//!
//! The behavioural contract every KEM or signature implementation exposes to
//! the harness. The harness never interprets key, ciphertext or signature
//! bytes; it allocates guarded buffers of the sizes a scheme declares and
//! forwards them.
//!
//! ## Calling conventions
//!
//! Scheme families disagree on argument shapes. Instead of branching at each
//! call site, a scheme declares its [`KemCallConvention`] or
//! [`SignCallConvention`] once; the harness resolves it into a single input
//! value ([`DecapsulationInputs`], [`SigningInputs`]) per call.

use crate::error::SchemeError;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size constants a scheme publishes, read by the harness rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeSizes {
    /// Public key bytes.
    pub public_key_bytes: usize,
    /// Secret key bytes.
    pub secret_key_bytes: usize,
    /// Ciphertext bytes (KEM) or maximum signature overhead bytes (signature).
    pub ciphertext_or_signature_bytes: usize,
    /// Shared secret bytes (KEM); zero for signature schemes.
    pub shared_secret_bytes: usize,
}

impl SchemeSizes {
    /// Sizes for a KEM.
    #[must_use]
    pub const fn kem(public_key: usize, secret_key: usize, ciphertext: usize, shared: usize) -> Self {
        Self {
            public_key_bytes: public_key,
            secret_key_bytes: secret_key,
            ciphertext_or_signature_bytes: ciphertext,
            shared_secret_bytes: shared,
        }
    }

    /// Sizes for a signature scheme.
    #[must_use]
    pub const fn signature(public_key: usize, secret_key: usize, signature: usize) -> Self {
        Self {
            public_key_bytes: public_key,
            secret_key_bytes: secret_key,
            ciphertext_or_signature_bytes: signature,
            shared_secret_bytes: 0,
        }
    }

    /// Ciphertext bytes of a KEM.
    #[must_use]
    pub const fn ciphertext_bytes(&self) -> usize {
        self.ciphertext_or_signature_bytes
    }

    /// Signature bytes of a signature scheme.
    #[must_use]
    pub const fn signature_bytes(&self) -> usize {
        self.ciphertext_or_signature_bytes
    }
}

/// Scheme operation, used in logs and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Key pair generation.
    Keypair,
    /// KEM encapsulation.
    Encapsulate,
    /// KEM decapsulation.
    Decapsulate,
    /// Signing.
    Sign,
    /// Opening a signed message.
    Open,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Keypair => write!(f, "keypair"),
            Operation::Encapsulate => write!(f, "encapsulate"),
            Operation::Decapsulate => write!(f, "decapsulate"),
            Operation::Sign => write!(f, "sign"),
            Operation::Open => write!(f, "open"),
        }
    }
}

/// Whether a scheme is a KEM or a signature scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeKind {
    /// Key encapsulation mechanism.
    Kem,
    /// Signature scheme.
    Signature,
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeKind::Kem => write!(f, "KEM"),
            SchemeKind::Signature => write!(f, "Signature"),
        }
    }
}

/// Argument shape of a KEM's decapsulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KemCallConvention {
    /// `decapsulate(ciphertext, secret_key)`.
    #[default]
    Standard,
    /// `decapsulate(secret_key, public_key, ciphertext)`: the public key is
    /// passed alongside the secret key.
    WithPublicKey,
}

/// Argument shape of a signature scheme's signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignCallConvention {
    /// `sign(message, secret_key)`.
    #[default]
    Standard,
    /// `sign(message, secret_key, seed, aux)`: two extra 32-byte buffers,
    /// zero-filled by the harness.
    Seeded,
}

/// Where a scheme's key pair comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeySource {
    /// `keypair()` generates a fresh pair from the supplied randomness.
    #[default]
    Generated,
    /// `keypair()` copies a key pair compiled into the implementation.
    /// The positive-agreement test is skipped for such schemes.
    Preloaded,
}

/// Length of each extra buffer in the [`SignCallConvention::Seeded`] shape.
pub const SIGNING_SEED_BYTES: usize = 32;

/// Inputs to a decapsulation call, shaped by [`KemCallConvention`].
#[derive(Clone, Copy)]
pub struct DecapsulationInputs<'a> {
    /// Ciphertext received from the encapsulating party.
    pub ciphertext: &'a [u8],
    /// Decapsulating party's secret key.
    pub secret_key: &'a [u8],
    /// Public key, present only under [`KemCallConvention::WithPublicKey`].
    pub public_key: Option<&'a [u8]>,
}

impl fmt::Debug for DecapsulationInputs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecapsulationInputs")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("secret_key_len", &self.secret_key.len())
            .field("has_public_key", &self.public_key.is_some())
            .finish()
    }
}

/// Inputs to a signing call, shaped by [`SignCallConvention`].
#[derive(Clone, Copy)]
pub struct SigningInputs<'a> {
    /// Message to sign.
    pub message: &'a [u8],
    /// Signer's secret key.
    pub secret_key: &'a [u8],
    /// Extra seed and auxiliary buffers under [`SignCallConvention::Seeded`].
    pub seed: Option<(&'a [u8; SIGNING_SEED_BYTES], &'a [u8; SIGNING_SEED_BYTES])>,
}

impl fmt::Debug for SigningInputs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningInputs")
            .field("message_len", &self.message.len())
            .field("secret_key_len", &self.secret_key.len())
            .field("seeded", &self.seed.is_some())
            .finish()
    }
}

/// A key-encapsulation mechanism under test.
///
/// Output buffers are exactly the sizes reported by [`KemScheme::sizes`].
pub trait KemScheme {
    /// Human-readable algorithm name.
    fn name(&self) -> &str;

    /// Published size constants.
    fn sizes(&self) -> SchemeSizes;

    /// Decapsulation argument shape.
    fn call_convention(&self) -> KemCallConvention {
        KemCallConvention::Standard
    }

    /// Key pair provenance.
    fn key_source(&self) -> KeySource {
        KeySource::Generated
    }

    /// Writes a fresh key pair into `public_key` and `secret_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] if the scheme reports failure.
    fn keypair(
        &self,
        rng: &mut dyn CryptoRngCore,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> Result<(), SchemeError>;

    /// Writes a ciphertext and the encapsulated shared secret for `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] if the scheme reports failure.
    fn encapsulate(
        &self,
        rng: &mut dyn CryptoRngCore,
        ciphertext: &mut [u8],
        shared_secret: &mut [u8],
        public_key: &[u8],
    ) -> Result<(), SchemeError>;

    /// Recovers the shared secret from a ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] if the scheme rejects its inputs outright.
    fn decapsulate(
        &self,
        shared_secret: &mut [u8],
        inputs: DecapsulationInputs<'_>,
    ) -> Result<(), SchemeError>;
}

/// A signature scheme under test, in signed-message form.
pub trait SignatureScheme {
    /// Human-readable algorithm name.
    fn name(&self) -> &str;

    /// Published size constants.
    fn sizes(&self) -> SchemeSizes;

    /// Signing argument shape.
    fn call_convention(&self) -> SignCallConvention {
        SignCallConvention::Standard
    }

    /// Writes a fresh key pair into `public_key` and `secret_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] if the scheme reports failure.
    fn keypair(
        &self,
        rng: &mut dyn CryptoRngCore,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> Result<(), SchemeError>;

    /// Writes the signed message into `signed_message` and returns its length.
    ///
    /// `signed_message` holds at least `message.len() + signature_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError`] if the scheme reports failure.
    fn sign(
        &self,
        rng: &mut dyn CryptoRngCore,
        signed_message: &mut [u8],
        inputs: SigningInputs<'_>,
    ) -> Result<usize, SchemeError>;

    /// Verifies `signed_message`, writes the recovered message into
    /// `message`, and returns its length.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::VerificationFailed`] if the signature is
    /// rejected.
    fn open(
        &self,
        message: &mut [u8],
        signed_message: &[u8],
        public_key: &[u8],
    ) -> Result<usize, SchemeError>;
}

/// A scheme resolved from the registry.
pub enum Scheme {
    /// Key encapsulation mechanism.
    Kem(Box<dyn KemScheme>),
    /// Signature scheme.
    Signature(Box<dyn SignatureScheme>),
}

impl Scheme {
    /// Scheme kind.
    #[must_use]
    pub fn kind(&self) -> SchemeKind {
        match self {
            Scheme::Kem(_) => SchemeKind::Kem,
            Scheme::Signature(_) => SchemeKind::Signature,
        }
    }

    /// Algorithm name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Scheme::Kem(kem) => kem.name(),
            Scheme::Signature(sig) => sig.name(),
        }
    }

    /// Published size constants.
    #[must_use]
    pub fn sizes(&self) -> SchemeSizes {
        match self {
            Scheme::Kem(kem) => kem.sizes(),
            Scheme::Signature(sig) => sig.sizes(),
        }
    }
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheme")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("sizes", &self.sizes())
            .finish()
    }
}

/// Checks that a buffer has the length a scheme declared.
///
/// # Errors
///
/// Returns [`SchemeError::InvalidLength`] on mismatch.
pub fn expect_len(what: &'static str, expected: usize, buffer: &[u8]) -> Result<(), SchemeError> {
    if buffer.len() != expected {
        return Err(SchemeError::InvalidLength { what, expected, actual: buffer.len() });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_sizes_have_no_shared_secret() {
        let sizes = SchemeSizes::signature(1312, 2560, 2420);
        assert_eq!(sizes.signature_bytes(), 2420);
        assert_eq!(sizes.shared_secret_bytes, 0);
    }

    #[test]
    fn test_kem_sizes_accessors() {
        let sizes = SchemeSizes::kem(800, 1632, 768, 32);
        assert_eq!(sizes.ciphertext_bytes(), 768);
        assert_eq!(sizes.public_key_bytes, 800);
        assert_eq!(sizes.secret_key_bytes, 1632);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(KemCallConvention::default(), KemCallConvention::Standard);
        assert_eq!(SignCallConvention::default(), SignCallConvention::Standard);
        assert_eq!(KeySource::default(), KeySource::Generated);
    }

    #[test]
    fn test_expect_len() {
        assert!(expect_len("ciphertext", 4, &[0; 4]).is_ok());
        assert_eq!(
            expect_len("ciphertext", 4, &[0; 3]).unwrap_err(),
            SchemeError::InvalidLength { what: "ciphertext", expected: 4, actual: 3 }
        );
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Decapsulate.to_string(), "decapsulate");
        assert_eq!(SchemeKind::Kem.to_string(), "KEM");
    }
}
