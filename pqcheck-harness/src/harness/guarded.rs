//! Guard bracketing and fault capture around scheme calls.

use crate::error::{HarnessError, SchemeError};
use crate::scheme::Operation;
use pqcheck_primitives::GuardedBuffer;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Rewrites the guard regions of every buffer.
pub(crate) fn prepare_all(buffers: &mut [&mut GuardedBuffer]) {
    for buffer in buffers.iter_mut() {
        buffer.prepare();
    }
}

/// Returns a [`HarnessError::MemorySafetyViolation`] naming every buffer
/// whose guards changed, or `None` if all are intact.
pub(crate) fn guard_violation(
    operation: Operation,
    buffers: &[(&'static str, &GuardedBuffer)],
) -> Option<HarnessError> {
    let damaged: Vec<&'static str> =
        buffers.iter().filter(|(_, buffer)| !buffer.check()).map(|(name, _)| *name).collect();
    if damaged.is_empty() {
        return None;
    }
    warn!(%operation, buffers = ?damaged, "Guard region overwritten");
    Some(HarnessError::MemorySafetyViolation { operation, buffers: damaged })
}

/// Runs one scheme call, converting a panic into
/// [`HarnessError::SchemePanicked`] and a reported failure into
/// [`HarnessError::SchemeFailure`].
pub(crate) fn invoke<T>(
    operation: Operation,
    call: impl FnOnce() -> Result<T, SchemeError>,
) -> Result<T, HarnessError> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            warn!(%operation, %error, "Scheme reported failure");
            Err(HarnessError::SchemeFailure(error))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%operation, %message, "Scheme panicked");
            Err(HarnessError::SchemePanicked { operation, message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
