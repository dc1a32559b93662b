//! KEM tests: positive agreement, corrupted secret key, corrupted ciphertext.

use super::guarded::{guard_violation, invoke, prepare_all};
use crate::error::{FailureKind, HarnessError, Result, SchemeError};
use crate::harness::HarnessConfig;
use crate::output::{self, StatusSink};
use crate::report::{CaseOutcome, RunReport, TestCase};
use crate::scheme::{
    DecapsulationInputs, KemCallConvention, KemScheme, KeySource, Operation, SchemeSizes,
};
use pqcheck_primitives::{GuardedBuffer, SurfRng};
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument};

/// Bytes drawn from the generator before each corrupted-ciphertext trial.
/// The draw is unused; it keeps the stream aligned with established vectors.
const POSITION_DRAW_BYTES: usize = 4;

type SchemeResult<T> = std::result::Result<T, SchemeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corruption {
    SecretKey,
    Ciphertext,
}

impl Corruption {
    fn test_case(self) -> TestCase {
        match self {
            Corruption::SecretKey => TestCase::InvalidSecretKey,
            Corruption::Ciphertext => TestCase::InvalidCiphertext,
        }
    }

    fn target(self) -> &'static str {
        match self {
            Corruption::SecretKey => "secret key",
            Corruption::Ciphertext => "ciphertext",
        }
    }

    fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Corruption::SecretKey => (output::OK_INVALID_SK, output::ERROR_INVALID_SK),
            Corruption::Ciphertext => (output::OK_INVALID_CT, output::ERROR_INVALID_CT),
        }
    }
}

struct KemBuffers {
    public_key: GuardedBuffer,
    secret_key: GuardedBuffer,
    ciphertext: GuardedBuffer,
    /// Decapsulating party's shared secret.
    shared_a: GuardedBuffer,
    /// Encapsulating party's shared secret.
    shared_b: GuardedBuffer,
}

impl KemBuffers {
    fn new(sizes: &SchemeSizes) -> Result<Self> {
        Ok(Self {
            public_key: GuardedBuffer::new(sizes.public_key_bytes)?,
            secret_key: GuardedBuffer::new(sizes.secret_key_bytes)?,
            ciphertext: GuardedBuffer::new(sizes.ciphertext_bytes())?,
            shared_a: GuardedBuffer::new(sizes.shared_secret_bytes)?,
            shared_b: GuardedBuffer::new(sizes.shared_secret_bytes)?,
        })
    }

    fn prepare(&mut self) {
        prepare_all(&mut [
            &mut self.public_key,
            &mut self.secret_key,
            &mut self.ciphertext,
            &mut self.shared_a,
            &mut self.shared_b,
        ]);
    }

    fn violation(&self, operation: Operation) -> Option<HarnessError> {
        guard_violation(
            operation,
            &[
                ("public key", &self.public_key),
                ("secret key", &self.secret_key),
                ("ciphertext", &self.ciphertext),
                ("shared secret a", &self.shared_a),
                ("shared secret b", &self.shared_b),
            ],
        )
    }

    fn secrets_agree(&self) -> bool {
        bool::from(self.shared_a.payload().ct_eq(self.shared_b.payload()))
    }
}

fn decapsulation_inputs<'a>(
    convention: KemCallConvention,
    ciphertext: &'a GuardedBuffer,
    secret_key: &'a GuardedBuffer,
    public_key: &'a GuardedBuffer,
) -> DecapsulationInputs<'a> {
    DecapsulationInputs {
        ciphertext: ciphertext.payload(),
        secret_key: secret_key.payload(),
        public_key: match convention {
            KemCallConvention::Standard => None,
            KemCallConvention::WithPublicKey => Some(public_key.payload()),
        },
    }
}

/// One KEM run: borrows the harness state for its duration.
pub(super) struct KemSession<'h> {
    kem: &'h dyn KemScheme,
    config: &'h HarnessConfig,
    rng: &'h mut SurfRng,
    sink: &'h mut dyn StatusSink,
    convention: KemCallConvention,
    buffers: KemBuffers,
}

impl<'h> KemSession<'h> {
    pub(super) fn new(
        kem: &'h dyn KemScheme,
        config: &'h HarnessConfig,
        rng: &'h mut SurfRng,
        sink: &'h mut dyn StatusSink,
    ) -> Result<Self> {
        let buffers = KemBuffers::new(&kem.sizes())?;
        Ok(Self { kem, config, rng, sink, convention: kem.call_convention(), buffers })
    }

    pub(super) fn run(mut self, report: &mut RunReport) -> Result<()> {
        if self.kem.key_source() == KeySource::Preloaded {
            info!(scheme = self.kem.name(), "Preloaded key pair, skipping positive agreement");
        } else {
            for iteration in 0..self.config.agreement_iterations {
                report.push(self.agreement_iteration(iteration)?);
            }
        }
        for iteration in 0..self.config.invalid_secret_key_trials {
            report.push(self.robustness_trial(Corruption::SecretKey, iteration)?);
        }
        for iteration in 0..self.config.invalid_ciphertext_trials {
            report.push(self.robustness_trial(Corruption::Ciphertext, iteration)?);
        }
        Ok(())
    }

    /// Brackets one scheme call with guard preparation and checking. A guard
    /// violation is recorded on `outcome` independently of the call result.
    fn guarded<T>(
        &mut self,
        outcome: &mut CaseOutcome,
        operation: Operation,
        call: impl FnOnce(&mut dyn CryptoRngCore, &mut KemBuffers) -> SchemeResult<T>,
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

    fn progress(&mut self, line: &str) -> Result<()> {
        if self.config.progress_messages {
            self.sink.emit(line)?;
        }
        Ok(())
    }

    fn keypair(&mut self, outcome: &mut CaseOutcome) -> Result<()> {
        let kem = self.kem;
        self.guarded(outcome, Operation::Keypair, |rng, b| {
            kem.keypair(rng, b.public_key.payload_mut(), b.secret_key.payload_mut())
        })
    }

    fn encapsulate(&mut self, outcome: &mut CaseOutcome) -> Result<()> {
        let kem = self.kem;
        self.guarded(outcome, Operation::Encapsulate, |rng, b| {
            kem.encapsulate(rng, b.ciphertext.payload_mut(), b.shared_b.payload_mut(), b.public_key.payload())
        })
    }

    fn decapsulate(&mut self, outcome: &mut CaseOutcome) -> Result<()> {
        let kem = self.kem;
        let convention = self.convention;
        self.guarded(outcome, Operation::Decapsulate, |_, b| {
            let inputs = decapsulation_inputs(convention, &b.ciphertext, &b.secret_key, &b.public_key);
            kem.decapsulate(b.shared_a.payload_mut(), inputs)
        })
    }

    /// Returns whether both parties derived the same secret.
    fn agreement_steps(&mut self, outcome: &mut CaseOutcome) -> Result<bool> {
        self.keypair(outcome)?;
        self.progress(output::DONE_KEYPAIR)?;

        let encapsulations = if self.config.duplicate_encapsulation { 2 } else { 1 };
        for _ in 0..encapsulations {
            self.encapsulate(outcome)?;
        }
        self.progress(output::DONE_ENCAPSULATION)?;

        self.decapsulate(outcome)?;
        self.progress(output::DONE_DECAPSULATION)?;

        Ok(self.buffers.secrets_agree())
    }

    #[instrument(level = "debug", skip(self), fields(scheme = self.kem.name()))]
    fn agreement_iteration(&mut self, iteration: usize) -> Result<CaseOutcome> {
        let mut outcome = CaseOutcome::new(TestCase::PositiveAgreement, iteration);
        let agreed = match self.agreement_steps(&mut outcome) {
            Ok(true) => true,
            Ok(false) => {
                outcome.record(&HarnessError::AgreementMismatch { iteration });
                false
            }
            Err(error) if error.kind().is_some() => {
                outcome.record(&error);
                false
            }
            Err(error) => return Err(error),
        };

        self.finish_agreement(&outcome, agreed)?;
        debug!(passed = outcome.passed, "Agreement iteration finished");
        Ok(outcome)
    }

    /// Emits the verdict lines of one agreement iteration. A guard violation
    /// is reported on its own line whatever the agreement result.
    fn finish_agreement(&mut self, outcome: &CaseOutcome, agreed: bool) -> Result<()> {
        if !agreed {
            self.sink.emit(output::ERROR_KEYS)?;
        }
        if !outcome.guard_intact {
            self.sink.emit(output::ERROR_CANARY)?;
        }
        if outcome.passed {
            self.sink.emit(output::OK_KEYS)?;
        }
        self.sink.emit(output::ITERATION_MARKER)?;
        Ok(())
    }

    /// Returns whether decapsulation of the corrupted input was rejected,
    /// i.e. did not reproduce the encapsulated secret.
    fn robustness_steps(&mut self, corruption: Corruption, outcome: &mut CaseOutcome) -> Result<bool> {
        if corruption == Corruption::Ciphertext {
            let mut position = [0u8; POSITION_DRAW_BYTES];
            self.rng.fill(&mut position);
        }

        self.keypair(outcome)?;
        self.encapsulate(outcome)?;

        match corruption {
            Corruption::SecretKey => self.rng.fill(self.buffers.secret_key.payload_mut()),
            Corruption::Ciphertext => self.rng.fill(self.buffers.ciphertext.payload_mut()),
        }

        match self.decapsulate(outcome) {
            Ok(()) => Ok(!self.buffers.secrets_agree()),
            Err(HarnessError::SchemeFailure(error)) => {
                debug!(%error, target = corruption.target(), "Decapsulation rejected corrupted input");
                Ok(true)
            }
            Err(error) => Err(error),
        }
    }

    #[instrument(level = "debug", skip(self), fields(scheme = self.kem.name()))]
    fn robustness_trial(&mut self, corruption: Corruption, iteration: usize) -> Result<CaseOutcome> {
        let mut outcome = CaseOutcome::new(corruption.test_case(), iteration);
        let rejected = match self.robustness_steps(corruption, &mut outcome) {
            Ok(true) => true,
            Ok(false) => {
                outcome.record(&HarnessError::RobustnessFailure { corrupted: corruption.target(), iteration });
                false
            }
            Err(error) if error.kind().is_some() => {
                outcome.record(&error);
                false
            }
            Err(error) => return Err(error),
        };

        self.finish_robustness(corruption, &outcome, rejected)?;
        debug!(passed = outcome.passed, "Robustness trial finished");
        Ok(outcome)
    }

    /// Emits the verdict lines of one robustness trial. The `ERROR invalid`
    /// tokens are reserved for a corrupted input reproducing the secret; a
    /// trial cut short by a scheme failure gets [`output::ERROR_SCHEME`].
    fn finish_robustness(&mut self, corruption: Corruption, outcome: &CaseOutcome, rejected: bool) -> Result<()> {
        let (ok, error) = corruption.tokens();
        let verdict = if rejected {
            ok
        } else if outcome.has_failure(FailureKind::RobustnessFailure) {
            error
        } else {
            output::ERROR_SCHEME
        };
        self.sink.emit(verdict)?;
        if !outcome.guard_intact {
            self.sink.emit(output::ERROR_CANARY)?;
        }
        self.sink.emit(output::ITERATION_MARKER)?;
        Ok(())
    }
}
