//! Toy schemes with injectable faults.
//!
//! The toy KEM: `pk = H(s)`, `ct = r ^ pk`, `ss = H(r || pk)`. The toy
//! signature: `sig = H(pk || m)`, signed message `sig || m`. Neither is
//! secure; both are self-consistent so every fault below is observable.

#![allow(dead_code, clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use pqcheck_harness::{
    DecapsulationInputs, KemCallConvention, KemScheme, KeySource, Operation, SchemeError, SchemeSizes,
    SignCallConvention, SignatureScheme, SigningInputs,
};
use rand_core::{CryptoRngCore, RngCore};
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::rc::Rc;

pub const TOY_LEN: usize = 32;

fn hash(parts: &[&[u8]]) -> [u8; TOY_LEN] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KemFault {
    None,
    /// Shared secret depends only on the ciphertext.
    IgnoresSecretKey,
    /// Shared secret depends only on the key pair.
    IgnoresCiphertext,
    /// Decapsulation flips one bit of the secret.
    BrokenAgreement,
    /// Encapsulation indexes one past the end of the shared secret.
    OutOfBounds,
    /// Decapsulation always reports failure.
    RejectsDecapsulation,
}

#[derive(Debug, Clone)]
pub struct ToyKem {
    pub fault: KemFault,
    pub convention: KemCallConvention,
    pub key_source: KeySource,
    pub encapsulations: Rc<Cell<usize>>,
    pub decapsulations: Rc<Cell<usize>>,
}

impl ToyKem {
    pub fn new(fault: KemFault) -> Self {
        Self {
            fault,
            convention: KemCallConvention::Standard,
            key_source: KeySource::Generated,
            encapsulations: Rc::new(Cell::new(0)),
            decapsulations: Rc::new(Cell::new(0)),
        }
    }

    pub fn honest() -> Self {
        Self::new(KemFault::None)
    }

    pub fn with_convention(mut self, convention: KemCallConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn preloaded(mut self) -> Self {
        self.key_source = KeySource::Preloaded;
        self
    }
}

impl KemScheme for ToyKem {
    fn name(&self) -> &str {
        "toy-kem"
    }

    fn sizes(&self) -> SchemeSizes {
        SchemeSizes::kem(TOY_LEN, TOY_LEN, TOY_LEN, TOY_LEN)
    }

    fn call_convention(&self) -> KemCallConvention {
        self.convention
    }

    fn key_source(&self) -> KeySource {
        self.key_source
    }

    fn keypair(
        &self,
        rng: &mut dyn CryptoRngCore,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> Result<(), SchemeError> {
        match self.key_source {
            KeySource::Generated => rng.fill_bytes(secret_key),
            KeySource::Preloaded => secret_key.copy_from_slice(&[0x5A; TOY_LEN]),
        }
        public_key.copy_from_slice(&hash(&[&*secret_key]));
        Ok(())
    }

    fn encapsulate(
        &self,
        rng: &mut dyn CryptoRngCore,
        ciphertext: &mut [u8],
        shared_secret: &mut [u8],
        public_key: &[u8],
    ) -> Result<(), SchemeError> {
        self.encapsulations.set(self.encapsulations.get() + 1);
        let mut r = [0u8; TOY_LEN];
        rng.fill_bytes(&mut r);
        ciphertext.copy_from_slice(&xor(&r, public_key));
        let secret = match self.fault {
            KemFault::IgnoresSecretKey => hash(&[&*ciphertext]),
            KemFault::IgnoresCiphertext => hash(&[public_key]),
            _ => hash(&[&r, public_key]),
        };
        shared_secret.copy_from_slice(&secret);
        if self.fault == KemFault::OutOfBounds {
            let past_end = shared_secret.len();
            shared_secret[past_end] = 0;
        }
        Ok(())
    }

    fn decapsulate(&self, shared_secret: &mut [u8], inputs: DecapsulationInputs<'_>) -> Result<(), SchemeError> {
        self.decapsulations.set(self.decapsulations.get() + 1);
        if self.fault == KemFault::RejectsDecapsulation {
            return Err(SchemeError::OperationFailed {
                operation: Operation::Decapsulate,
                reason: "always rejects".to_string(),
            });
        }
        let public_key = match self.convention {
            KemCallConvention::Standard => hash(&[inputs.secret_key]),
            KemCallConvention::WithPublicKey => {
                let pk = inputs.public_key.ok_or(SchemeError::OperationFailed {
                    operation: Operation::Decapsulate,
                    reason: "public key missing".to_string(),
                })?;
                assert_eq!(pk.len(), TOY_LEN);
                hash(&[inputs.secret_key])
            }
        };
        let r = xor(inputs.ciphertext, &public_key);
        let mut secret = match self.fault {
            KemFault::IgnoresSecretKey => hash(&[inputs.ciphertext]),
            KemFault::IgnoresCiphertext => hash(&[&public_key]),
            _ => hash(&[&r, &public_key]),
        };
        if self.fault == KemFault::BrokenAgreement {
            secret[0] ^= 1;
        }
        shared_secret.copy_from_slice(&secret);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigFault {
    None,
    /// `open` rejects everything.
    RejectsAll,
    /// `open` returns the message with its first byte flipped.
    CorruptsMessage,
    /// `sign` panics for messages at least this long.
    PanicsFrom(usize),
}

#[derive(Debug, Clone)]
pub struct ToySignature {
    pub fault: SigFault,
    pub convention: SignCallConvention,
    pub signs: Rc<Cell<usize>>,
}

impl ToySignature {
    pub fn new(fault: SigFault) -> Self {
        Self { fault, convention: SignCallConvention::Standard, signs: Rc::new(Cell::new(0)) }
    }

    pub fn honest() -> Self {
        Self::new(SigFault::None)
    }

    pub fn seeded(mut self) -> Self {
        self.convention = SignCallConvention::Seeded;
        self
    }
}

impl SignatureScheme for ToySignature {
    fn name(&self) -> &str {
        "toy-signature"
    }

    fn sizes(&self) -> SchemeSizes {
        SchemeSizes::signature(TOY_LEN, TOY_LEN, TOY_LEN)
    }

    fn call_convention(&self) -> SignCallConvention {
        self.convention
    }

    fn keypair(
        &self,
        rng: &mut dyn CryptoRngCore,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> Result<(), SchemeError> {
        rng.fill_bytes(secret_key);
        public_key.copy_from_slice(&hash(&[&*secret_key]));
        Ok(())
    }

    fn sign(
        &self,
        _rng: &mut dyn CryptoRngCore,
        signed_message: &mut [u8],
        inputs: SigningInputs<'_>,
    ) -> Result<usize, SchemeError> {
        self.signs.set(self.signs.get() + 1);
        if let SigFault::PanicsFrom(limit) = self.fault {
            if inputs.message.len() >= limit {
                panic!("toy signer refuses {} bytes", inputs.message.len());
            }
        }
        if self.convention == SignCallConvention::Seeded {
            let (seed, aux) = inputs.seed.ok_or(SchemeError::OperationFailed {
                operation: Operation::Sign,
                reason: "seed missing".to_string(),
            })?;
            assert!(seed.iter().chain(aux.iter()).all(|&b| b == 0));
        }
        let public_key = hash(&[inputs.secret_key]);
        let signature = hash(&[&public_key, inputs.message]);
        let total = TOY_LEN + inputs.message.len();
        signed_message[..TOY_LEN].copy_from_slice(&signature);
        signed_message[TOY_LEN..total].copy_from_slice(inputs.message);
        Ok(total)
    }

    fn open(&self, message: &mut [u8], signed_message: &[u8], public_key: &[u8]) -> Result<usize, SchemeError> {
        if self.fault == SigFault::RejectsAll || signed_message.len() < TOY_LEN {
            return Err(SchemeError::VerificationFailed);
        }
        let (signature, body) = signed_message.split_at(TOY_LEN);
        if signature != hash(&[public_key, body]) {
            return Err(SchemeError::VerificationFailed);
        }
        message[..body.len()].copy_from_slice(body);
        if self.fault == SigFault::CorruptsMessage && !body.is_empty() {
            message[0] ^= 0xFF;
        }
        Ok(body.len())
    }
}
