//! Signature known-answer sweep.
//!
//! For each message length in `0, 1, 2, 4, ..., max_message_len`: draw the
//! message, generate a key pair, dump it, sign, dump the signed message,
//! open, and compare. The first failure halts the sweep.

use super::guarded::{guard_violation, invoke, prepare_all};
use crate::error::{FailureKind, HarnessError, Result, SchemeError};
use crate::harness::HarnessConfig;
use crate::output::{self, StatusSink};
use crate::report::{CaseOutcome, RunReport, TestCase};
use crate::scheme::{
    Operation, SIGNING_SEED_BYTES, SchemeSizes, SignCallConvention, SignatureScheme, SigningInputs,
};
use pqcheck_primitives::{GuardedBuffer, SurfRng};
use rand_core::CryptoRngCore;
use tracing::{debug, instrument, warn};

type SchemeResult<T> = std::result::Result<T, SchemeError>;

/// Seed and auxiliary inputs for [`SignCallConvention::Seeded`] schemes.
const ZERO_SEED: [u8; SIGNING_SEED_BYTES] = [0u8; SIGNING_SEED_BYTES];

struct SignatureBuffers {
    public_key: GuardedBuffer,
    secret_key: GuardedBuffer,
    message: GuardedBuffer,
    signed_message: GuardedBuffer,
    opened: GuardedBuffer,
}

impl SignatureBuffers {
    fn new(sizes: &SchemeSizes, max_message_len: usize) -> Result<Self> {
        let signed_len = max_message_len.saturating_add(sizes.signature_bytes());
        Ok(Self {
            public_key: GuardedBuffer::new(sizes.public_key_bytes)?,
            secret_key: GuardedBuffer::new(sizes.secret_key_bytes)?,
            message: GuardedBuffer::new(max_message_len)?,
            signed_message: GuardedBuffer::new(signed_len)?,
            opened: GuardedBuffer::new(signed_len)?,
        })
    }

    fn prepare(&mut self) {
        prepare_all(&mut [
            &mut self.public_key,
            &mut self.secret_key,
            &mut self.message,
            &mut self.signed_message,
            &mut self.opened,
        ]);
    }

    fn violation(&self, operation: Operation) -> Option<HarnessError> {
        guard_violation(
            operation,
            &[
                ("public key", &self.public_key),
                ("secret key", &self.secret_key),
                ("message", &self.message),
                ("signed message", &self.signed_message),
                ("opened message", &self.opened),
            ],
        )
    }
}

fn dump(sink: &mut dyn StatusSink, enabled: bool, bytes: &[u8]) -> Result<()> {
    if enabled {
        sink.emit(&hex::encode(bytes))?;
    }
    Ok(())
}

/// One signature sweep: borrows the harness state for its duration.
pub(super) struct SignatureSession<'h> {
    scheme: &'h dyn SignatureScheme,
    config: &'h HarnessConfig,
    rng: &'h mut SurfRng,
    sink: &'h mut dyn StatusSink,
    convention: SignCallConvention,
    buffers: SignatureBuffers,
}

impl<'h> SignatureSession<'h> {
    pub(super) fn new(
        scheme: &'h dyn SignatureScheme,
        config: &'h HarnessConfig,
        rng: &'h mut SurfRng,
        sink: &'h mut dyn StatusSink,
    ) -> Result<Self> {
        let buffers = SignatureBuffers::new(&scheme.sizes(), config.max_message_len)?;
        Ok(Self { scheme, config, rng, sink, convention: scheme.call_convention(), buffers })
    }

    /// Runs the sweep, marking `report` halted on the first failure.
    pub(super) fn run(mut self, report: &mut RunReport) -> Result<()> {
        for (iteration, message_len) in self.config.message_lengths().into_iter().enumerate() {
            let outcome = self.vector(iteration, message_len)?;
            let passed = outcome.passed;
            report.push(outcome);
            if !passed {
                warn!(scheme = self.scheme.name(), message_len, "Signature sweep halted");
                report.halted = true;
                break;
            }
        }
        Ok(())
    }

    fn guarded<T>(
        &mut self,
        outcome: &mut CaseOutcome,
        operation: Operation,
        call: impl FnOnce(&mut dyn CryptoRngCore, &mut SignatureBuffers) -> SchemeResult<T>,
    ) -> Result<T> {
        self.buffers.prepare();
        let rng: &mut dyn CryptoRngCore = &mut *self.rng;
        let buffers = &mut self.buffers;
        let result = invoke(operation, || call(rng, buffers));
        if let Some(violation) = self.buffers.violation(operation) {
            outcome.record(&violation);
        }
        result
    }

    fn vector_steps(&mut self, message_len: usize, outcome: &mut CaseOutcome) -> Result<()> {
        self.rng.fill(&mut self.buffers.message.payload_mut()[..message_len]);

        let scheme = self.scheme;
        self.guarded(outcome, Operation::Keypair, |rng, b| {
            scheme.keypair(rng, b.public_key.payload_mut(), b.secret_key.payload_mut())
        })?;
        let enabled = self.config.dump_vectors;
        dump(&mut *self.sink, enabled, self.buffers.public_key.payload())?;
        dump(&mut *self.sink, enabled, self.buffers.secret_key.payload())?;

        let seed = match self.convention {
            SignCallConvention::Standard => None,
            SignCallConvention::Seeded => Some((&ZERO_SEED, &ZERO_SEED)),
        };
        let signed_len = self.guarded(outcome, Operation::Sign, |rng, b| {
            let inputs = SigningInputs {
                message: &b.message.payload()[..message_len],
                secret_key: b.secret_key.payload(),
                seed,
            };
            scheme.sign(rng, b.signed_message.payload_mut(), inputs)
        })?;
        let capacity = self.buffers.signed_message.len();
        if signed_len > capacity {
            return Err(SchemeError::InvalidLength {
                what: "signed message",
                expected: capacity,
                actual: signed_len,
            }
            .into());
        }
        dump(&mut *self.sink, enabled, &self.buffers.signed_message.payload()[..signed_len])?;

        let opened_len = self
            .guarded(outcome, Operation::Open, |_, b| {
                let signed = &b.signed_message.payload()[..signed_len];
                scheme.open(b.opened.payload_mut(), signed, b.public_key.payload())
            })
            .map_err(|error| match error {
                HarnessError::SchemeFailure(SchemeError::VerificationFailed) => {
                    HarnessError::VerificationFailure { message_len }
                }
                other => other,
            })?;

        let message = &self.buffers.message.payload()[..message_len];
        let recovered = self.buffers.opened.payload().get(..opened_len);
        if recovered != Some(message) {
            return Err(HarnessError::MessageRecoveryFailure { message_len });
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(scheme = self.scheme.name()))]
    fn vector(&mut self, iteration: usize, message_len: usize) -> Result<CaseOutcome> {
        let mut outcome = CaseOutcome::new(TestCase::SignatureVector { message_len }, iteration);
        match self.vector_steps(message_len, &mut outcome) {
            Ok(()) => {}
            Err(error) if error.kind().is_some() => outcome.record(&error),
            Err(error) => return Err(error),
        }

        self.finish_vector(&outcome)?;
        debug!(passed = outcome.passed, "Signature vector finished");
        Ok(outcome)
    }

    /// Emits the verdict lines of a failed vector: the cryptographic verdict
    /// if there is one, then a separate canary line for a guard violation.
    fn finish_vector(&mut self, outcome: &CaseOutcome) -> Result<()> {
        if outcome.passed {
            return Ok(());
        }
        if outcome.has_failure(FailureKind::MessageRecoveryFailure) {
            self.sink.emit(output::ERROR_RECOVERY)?;
        } else if outcome.failures.iter().any(|f| f.kind != FailureKind::MemorySafetyViolation) {
            self.sink.emit(output::ERROR_VERIFICATION)?;
        }
        if !outcome.guard_intact {
            self.sink.emit(output::ERROR_CANARY)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::schemes::MlDsa44;
    use pqcheck_primitives::GUARD_LEN;

    fn overrun(buffer: &mut GuardedBuffer) {
        let end = GUARD_LEN + buffer.len();
        buffer.storage_mut()[end] ^= 0x5A;
    }

    fn lines(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    fn config() -> HarnessConfig {
        HarnessConfig::default().with_max_message_len(16)
    }

    #[test]
    fn test_guard_violation_with_rejection_reports_both() {
        let config = config();
        let mut rng = SurfRng::new();
        let mut sink = MemorySink::new();
        let mut session = SignatureSession::new(&MlDsa44, &config, &mut rng, &mut sink).unwrap();

        let mut outcome = CaseOutcome::new(TestCase::SignatureVector { message_len: 0 }, 0);
        let err = session
            .guarded(&mut outcome, Operation::Open, |_, b| {
                overrun(&mut b.message);
                Err::<usize, _>(SchemeError::VerificationFailed)
            })
            .unwrap_err();
        assert!(matches!(err, HarnessError::SchemeFailure(SchemeError::VerificationFailed)));
        outcome.record(&HarnessError::VerificationFailure { message_len: 0 });
        assert!(!outcome.guard_intact);
        assert!(outcome.has_failure(FailureKind::MemorySafetyViolation));
        assert!(outcome.has_failure(FailureKind::VerificationFailure));

        session.finish_vector(&outcome).unwrap();
        drop(session);
        assert_eq!(sink.lines(), lines(&[output::ERROR_VERIFICATION, output::ERROR_CANARY]).as_slice());
    }

    #[test]
    fn test_guard_violation_with_recovery_failure_reports_both() {
        let config = config();
        let mut rng = SurfRng::new();
        let mut sink = MemorySink::new();
        let mut session = SignatureSession::new(&MlDsa44, &config, &mut rng, &mut sink).unwrap();

        let mut outcome = CaseOutcome::new(TestCase::SignatureVector { message_len: 4 }, 3);
        let opened = session
            .guarded(&mut outcome, Operation::Open, |_, b| {
                overrun(&mut b.opened);
                Ok(0usize)
            })
            .unwrap();
        assert_eq!(opened, 0);
        outcome.record(&HarnessError::MessageRecoveryFailure { message_len: 4 });

        session.finish_vector(&outcome).unwrap();
        drop(session);
        assert_eq!(sink.lines(), lines(&[output::ERROR_RECOVERY, output::ERROR_CANARY]).as_slice());
    }

    #[test]
    fn test_guard_violation_alone_reports_canary_only() {
        let config = config();
        let mut rng = SurfRng::new();
        let mut sink = MemorySink::new();
        let mut session = SignatureSession::new(&MlDsa44, &config, &mut rng, &mut sink).unwrap();

        let mut outcome = CaseOutcome::new(TestCase::SignatureVector { message_len: 0 }, 0);
        session
            .guarded(&mut outcome, Operation::Keypair, |rng, b| {
                MlDsa44.keypair(rng, b.public_key.payload_mut(), b.secret_key.payload_mut())?;
                overrun(&mut b.public_key);
                Ok(())
            })
            .unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].detail.contains("public key"));

        session.finish_vector(&outcome).unwrap();
        drop(session);
        assert_eq!(sink.lines(), lines(&[output::ERROR_CANARY]).as_slice());
    }

    #[test]
    fn test_passing_vector_emits_nothing() {
        let config = config();
        let mut rng = SurfRng::new();
        let mut sink = MemorySink::new();
        let mut session = SignatureSession::new(&MlDsa44, &config, &mut rng, &mut sink).unwrap();
        session.finish_vector(&CaseOutcome::new(TestCase::SignatureVector { message_len: 0 }, 0)).unwrap();
        drop(session);
        assert!(sink.lines().is_empty());
    }
}
