//! Error types for the conformance harness.

use crate::scheme::Operation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a scheme implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    /// The operation ran but reported failure.
    #[error("{operation} failed: {reason}")]
    OperationFailed {
        /// Operation that failed.
        operation: Operation,
        /// Scheme-provided reason.
        reason: String,
    },

    /// A buffer handed to the scheme does not have the size it declared.
    #[error("Invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Buffer role.
        what: &'static str,
        /// Declared size in bytes.
        expected: usize,
        /// Size received in bytes.
        actual: usize,
    },

    /// A signed message was rejected.
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Errors from the scheme registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No scheme is registered under this identifier.
    #[error("Unknown scheme: {0}")]
    Unknown(String),

    /// A scheme is already registered under this identifier.
    #[error("Scheme already registered: {0}")]
    Duplicate(String),
}

/// Invalid harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A KEM run was requested with every KEM test disabled.
    #[error("No KEM tests enabled: all KEM iteration counts are zero")]
    NothingToRun,

    /// The signature sweep bound is larger than the harness supports.
    #[error("Maximum message length {actual} exceeds limit {limit}")]
    MessageLengthTooLarge {
        /// Requested bound.
        actual: usize,
        /// Supported bound.
        limit: usize,
    },
}

/// Classification of a non-fatal or fatal test failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Valid-path shared secrets differ.
    AgreementMismatch,
    /// A corrupted input still produced the agreeing secret.
    RobustnessFailure,
    /// A guard sentinel was altered by scheme code.
    MemorySafetyViolation,
    /// A valid signature was rejected.
    VerificationFailure,
    /// Opened message bytes differ from the signed message.
    MessageRecoveryFailure,
    /// A scheme operation returned an error.
    SchemeFailure,
    /// A scheme operation panicked.
    SchemePanicked,
}

/// Errors raised while running the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Shared secrets from encapsulation and decapsulation differ.
    #[error("Shared secrets disagree in iteration {iteration}")]
    AgreementMismatch {
        /// Iteration index.
        iteration: usize,
    },

    /// Decapsulation with a corrupted input reproduced the encapsulated secret.
    #[error("Corrupted {corrupted} still yields the shared secret in trial {iteration}")]
    RobustnessFailure {
        /// Which input was replaced with random bytes.
        corrupted: &'static str,
        /// Trial index.
        iteration: usize,
    },

    /// Scheme code wrote outside the declared bounds of one or more buffers.
    #[error("Guard overwritten during {operation}: {}", .buffers.join(", "))]
    MemorySafetyViolation {
        /// Operation that was running.
        operation: Operation,
        /// Buffers whose guards changed.
        buffers: Vec<&'static str>,
    },

    /// A signed message failed to open.
    #[error("Signature verification failed for {message_len}-byte message")]
    VerificationFailure {
        /// Message length in bytes.
        message_len: usize,
    },

    /// The opened message differs from the one signed.
    #[error("Message recovery failed for {message_len}-byte message")]
    MessageRecoveryFailure {
        /// Message length in bytes.
        message_len: usize,
    },

    /// A scheme operation returned an error.
    #[error("Scheme failure: {0}")]
    SchemeFailure(#[from] SchemeError),

    /// A scheme operation panicked.
    #[error("{operation} panicked: {message}")]
    SchemePanicked {
        /// Operation that panicked.
        operation: Operation,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Buffer allocation failed.
    #[error(transparent)]
    Primitive(#[from] pqcheck_primitives::Error),

    /// The status channel could not be written.
    #[error("Status output failed: {0}")]
    Output(#[from] std::io::Error),
}

impl HarnessError {
    /// Test-failure classification, or `None` for infrastructure errors.
    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::AgreementMismatch { .. } => Some(FailureKind::AgreementMismatch),
            Self::RobustnessFailure { .. } => Some(FailureKind::RobustnessFailure),
            Self::MemorySafetyViolation { .. } => Some(FailureKind::MemorySafetyViolation),
            Self::VerificationFailure { .. } => Some(FailureKind::VerificationFailure),
            Self::MessageRecoveryFailure { .. } => Some(FailureKind::MessageRecoveryFailure),
            Self::SchemeFailure(_) => Some(FailureKind::SchemeFailure),
            Self::SchemePanicked { .. } => Some(FailureKind::SchemePanicked),
            Self::Registry(_) | Self::Config(_) | Self::Primitive(_) | Self::Output(_) => None,
        }
    }
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
