#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Harness configuration.

use crate::error::ConfigError;
use crate::scheme::SchemeKind;

/// Largest supported signature sweep bound (1 MiB).
pub const MAX_MESSAGE_LEN_LIMIT: usize = 1 << 20;

/// Iteration counts and output options for a [`ConformanceHarness`] run.
///
/// The defaults match the long-standing embedded KEM and signature test
/// programs, so status streams stay comparable with existing logs.
///
/// # Examples
/// ```rust
/// use pqcheck_harness::HarnessConfig;
///
/// let config = HarnessConfig::new()
///     .with_agreement_iterations(100)
///     .with_progress_messages(true);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`ConformanceHarness`]: crate::ConformanceHarness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Positive-agreement iterations.
    ///
    /// Default: `10`
    pub agreement_iterations: usize,

    /// Trials decapsulating with a random secret key.
    ///
    /// Default: `1`
    pub invalid_secret_key_trials: usize,

    /// Trials decapsulating a random ciphertext.
    ///
    /// Default: `10`
    pub invalid_ciphertext_trials: usize,

    /// Inclusive upper bound of the signature sweep `0, 1, 2, 4, ...`.
    ///
    /// Default: `2048`
    pub max_message_len: usize,

    /// Issue a second, discarded encapsulation before each decapsulation in
    /// the positive-agreement test.
    ///
    /// Default: `false`
    pub duplicate_encapsulation: bool,

    /// Emit `DONE ...!` lines after each KEM operation.
    ///
    /// Default: `false`
    pub progress_messages: bool,

    /// Emit hex dumps of public key, secret key and signed message for each
    /// signature vector.
    ///
    /// Default: `true`
    pub dump_vectors: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            agreement_iterations: 10,
            invalid_secret_key_trials: 1,
            invalid_ciphertext_trials: 10,
            max_message_len: 2048,
            duplicate_encapsulation: false,
            progress_messages: false,
            dump_vectors: true,
        }
    }
}

impl HarnessConfig {
    /// Creates a configuration with the default counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Small counts for smoke runs.
    #[must_use]
    pub fn quick() -> Self {
        Self::default()
            .with_agreement_iterations(2)
            .with_invalid_ciphertext_trials(2)
            .with_max_message_len(16)
    }

    /// Sets the positive-agreement iteration count.
    #[must_use]
    pub fn with_agreement_iterations(mut self, iterations: usize) -> Self {
        self.agreement_iterations = iterations;
        self
    }

    /// Sets the corrupted secret key trial count.
    #[must_use]
    pub fn with_invalid_secret_key_trials(mut self, trials: usize) -> Self {
        self.invalid_secret_key_trials = trials;
        self
    }

    /// Sets the corrupted ciphertext trial count.
    #[must_use]
    pub fn with_invalid_ciphertext_trials(mut self, trials: usize) -> Self {
        self.invalid_ciphertext_trials = trials;
        self
    }

    /// Sets the inclusive signature sweep bound.
    #[must_use]
    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }

    /// Enables or disables the duplicate encapsulation call.
    #[must_use]
    pub fn with_duplicate_encapsulation(mut self, enabled: bool) -> Self {
        self.duplicate_encapsulation = enabled;
        self
    }

    /// Enables or disables progress lines.
    #[must_use]
    pub fn with_progress_messages(mut self, enabled: bool) -> Self {
        self.progress_messages = enabled;
        self
    }

    /// Enables or disables signature vector hex dumps.
    #[must_use]
    pub fn with_dump_vectors(mut self, enabled: bool) -> Self {
        self.dump_vectors = enabled;
        self
    }

    /// Message lengths of the signature sweep: zero, then powers of two up
    /// to and including `max_message_len`.
    #[must_use]
    pub fn message_lengths(&self) -> Vec<usize> {
        let max = self.max_message_len;
        std::iter::once(0)
            .chain(std::iter::successors(Some(1usize), |len| len.checked_mul(2)).take_while(|&len| len <= max))
            .collect()
    }

    /// Validates the settings shared by every run.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_message_len` exceeds [`MAX_MESSAGE_LEN_LIMIT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_len > MAX_MESSAGE_LEN_LIMIT {
            return Err(ConfigError::MessageLengthTooLarge {
                actual: self.max_message_len,
                limit: MAX_MESSAGE_LEN_LIMIT,
            });
        }

        Ok(())
    }

    /// Validates the configuration for a run against a scheme of `kind`.
    ///
    /// The KEM iteration counts only matter to KEM runs, so a signature
    /// sweep is accepted with all of them at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - [`validate`](Self::validate) fails
    /// - `kind` is [`SchemeKind::Kem`] and all three KEM counts are zero
    pub fn validate_for(&self, kind: SchemeKind) -> Result<(), ConfigError> {
        self.validate()?;

        if kind == SchemeKind::Kem
            && self.agreement_iterations == 0
            && self.invalid_secret_key_trials == 0
            && self.invalid_ciphertext_trials == 0
        {
            return Err(ConfigError::NothingToRun);
        }

        Ok(())
    }
}
