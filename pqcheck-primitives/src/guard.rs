#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Guarded Buffers
//!
//! Every buffer handed to scheme code is allocated with an 8-byte sentinel
//! region on each side of the payload. The sentinels are written before the
//! call and compared afterwards; a mismatch means the scheme wrote outside
//! the bounds it declared, independent of whether its cryptographic result
//! was correct.
//!
//! Payload bytes are zeroized when the buffer is dropped, since the harness
//! routinely stores secret keys and shared secrets in them.

use crate::error::{Error, Result};
use zeroize::Zeroize;

/// Sentinel pattern written at both ends of a guarded buffer.
pub const CANARY: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];

/// Length of each sentinel region in bytes.
pub const GUARD_LEN: usize = CANARY.len();

/// Which sentinel regions survived a scheme call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardStatus {
    /// Sentinel before the payload still matches [`CANARY`].
    pub leading_intact: bool,
    /// Sentinel after the payload still matches [`CANARY`].
    pub trailing_intact: bool,
}

impl GuardStatus {
    /// Both sentinel regions are intact.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.leading_intact && self.trailing_intact
    }
}

/// A payload region flanked by sentinel bytes.
pub struct GuardedBuffer {
    storage: Vec<u8>,
    payload_len: usize,
}

impl std::fmt::Debug for GuardedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedBuffer")
            .field("payload_len", &self.payload_len)
            .field("status", &self.status())
            .finish()
    }
}

impl GuardedBuffer {
    /// Allocates a zeroed payload of `payload_len` bytes with prepared guards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGuardLayout`] if the total allocation size
    /// would overflow `usize`.
    pub fn new(payload_len: usize) -> Result<Self> {
        let total = payload_len
            .checked_add(2 * GUARD_LEN)
            .ok_or_else(|| Error::InvalidGuardLayout(format!("payload of {payload_len} bytes")))?;
        let mut buffer = Self { storage: vec![0u8; total], payload_len };
        buffer.prepare();
        Ok(buffer)
    }

    /// Writes the sentinel pattern into both guard regions.
    pub fn prepare(&mut self) {
        let trailing = GUARD_LEN + self.payload_len;
        self.storage[..GUARD_LEN].copy_from_slice(&CANARY);
        self.storage[trailing..].copy_from_slice(&CANARY);
    }

    /// Reports which guard regions still hold the sentinel pattern.
    #[must_use]
    pub fn status(&self) -> GuardStatus {
        let trailing = GUARD_LEN + self.payload_len;
        GuardStatus {
            leading_intact: self.storage[..GUARD_LEN] == CANARY,
            trailing_intact: self.storage[trailing..] == CANARY,
        }
    }

    /// Returns `true` if both guard regions still hold the sentinel pattern.
    #[must_use]
    pub fn check(&self) -> bool {
        self.status().is_intact()
    }

    /// Declared payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload_len
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload_len == 0
    }

    /// Payload bytes, excluding the guards.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.storage[GUARD_LEN..GUARD_LEN + self.payload_len]
    }

    /// Mutable payload bytes, excluding the guards.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.storage[GUARD_LEN..GUARD_LEN + self.payload_len]
    }

    /// Entire backing storage, guards included.
    ///
    /// Intended for bridges that hand the buffer to foreign code and for
    /// tests that simulate an overrun.
    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }
}

impl Drop for GuardedBuffer {
    fn drop(&mut self) {
        self.storage.zeroize();
    }
}
