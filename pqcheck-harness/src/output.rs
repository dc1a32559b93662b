#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Status Channel
//!
//! Line-oriented text sink carrying the harness's progress and verdict
//! tokens. Existing log scrapers key on these exact strings.

use std::io::{self, Write};

/// Emitted once before any test runs.
pub const START_MARKER: &str = "==========================";
/// Emitted after every agreement or robustness iteration.
pub const ITERATION_MARKER: &str = "+";
/// Emitted when a run finishes or halts.
pub const COMPLETION_MARKER: &str = "#";

/// Positive agreement passed.
pub const OK_KEYS: &str = "OK KEYS";
/// Positive agreement failed.
pub const ERROR_KEYS: &str = "ERROR KEYS";
/// A guard region was overwritten.
pub const ERROR_CANARY: &str = "ERROR canary overwritten";
/// Corrupted secret key was rejected.
pub const OK_INVALID_SK: &str = "OK invalid sk_a";
/// Corrupted secret key reproduced the shared secret.
pub const ERROR_INVALID_SK: &str = "ERROR invalid sk_a";
/// Corrupted ciphertext was rejected.
pub const OK_INVALID_CT: &str = "OK invalid ciphertext";
/// Corrupted ciphertext reproduced the shared secret.
pub const ERROR_INVALID_CT: &str = "ERROR invalid ciphertext";

/// A robustness trial could not reach decapsulation of the corrupted input:
/// key generation or encapsulation failed or panicked.
pub const ERROR_SCHEME: &str = "ERROR scheme failure";

/// A valid signed message failed to open.
pub const ERROR_VERIFICATION: &str = "ERROR: signature verification failed";
/// The opened message differs from the signed one.
pub const ERROR_RECOVERY: &str = "ERROR: message recovery failed";

/// Progress after key generation.
pub const DONE_KEYPAIR: &str = "DONE key pair generation!";
/// Progress after encapsulation.
pub const DONE_ENCAPSULATION: &str = "DONE encapsulation!";
/// Progress after decapsulation.
pub const DONE_DECAPSULATION: &str = "DONE decapsulation!";

/// Destination for status lines.
pub trait StatusSink {
    /// Writes one line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn emit(&mut self, line: &str) -> io::Result<()>;
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        (**self).emit(line)
    }
}

impl<S: StatusSink + ?Sized> StatusSink for Box<S> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        (**self).emit(line)
    }
}

/// Writes each line to an [`io::Write`] and flushes it immediately.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Sink on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines equal to `token`.
    #[must_use]
    pub fn count(&self, token: &str) -> usize {
        self.lines.iter().filter(|line| line.as_str() == token).count()
    }

    /// Whether any line equals `token`.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.count(token) > 0
    }
}

impl StatusSink for MemorySink {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_start_marker_width() {
        assert_eq!(START_MARKER.len(), 26);
        assert!(START_MARKER.chars().all(|c| c == '='));
    }

    #[test]
    fn test_writer_sink_one_line_per_token() {
        let mut sink = WriterSink::new(Vec::new());
        sink.emit(START_MARKER).unwrap();
        sink.emit(OK_KEYS).unwrap();
        sink.emit(ITERATION_MARKER).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, format!("{START_MARKER}\nOK KEYS\n+\n"));
    }

    #[test]
    fn test_memory_sink_counts() {
        let mut sink = MemorySink::new();
        for line in [ITERATION_MARKER, OK_KEYS, ITERATION_MARKER] {
            sink.emit(line).unwrap();
        }
        assert_eq!(sink.count(ITERATION_MARKER), 2);
        assert!(sink.contains(OK_KEYS));
        assert!(!sink.contains(ERROR_KEYS));
        assert_eq!(sink.lines().len(), 3);
    }

    #[test]
    fn test_sink_through_mutable_reference() {
        fn finish<S: StatusSink>(mut sink: S) {
            sink.emit(COMPLETION_MARKER).unwrap();
        }

        let mut sink = MemorySink::new();
        finish(&mut sink);
        assert_eq!(sink.lines(), [COMPLETION_MARKER.to_string()]);
    }
}
