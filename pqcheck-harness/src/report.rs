#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![allow(clippy::cast_precision_loss)]

//! Run Reports
//!
//! Structured record of one harness run: every test case, its verdict, and
//! whether the guard regions survived. Serializable to JSON for CI
//! consumption and renderable as a plain-text summary.

use crate::error::{FailureKind, HarnessError};
use crate::scheme::SchemeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which harness test a case belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCase {
    /// keypair, encapsulate, decapsulate, compare.
    PositiveAgreement,
    /// Decapsulation with a random secret key must not agree.
    InvalidSecretKey,
    /// Decapsulation of a random ciphertext must not agree.
    InvalidCiphertext,
    /// One vector of the signature sweep.
    SignatureVector {
        /// Message length of this vector.
        message_len: usize,
    },
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestCase::PositiveAgreement => write!(f, "positive agreement"),
            TestCase::InvalidSecretKey => write!(f, "invalid secret key"),
            TestCase::InvalidCiphertext => write!(f, "invalid ciphertext"),
            TestCase::SignatureVector { message_len } => write!(f, "signature mlen={message_len}"),
        }
    }
}

/// A classified failure inside one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub detail: String,
}

/// Verdict for one iteration of one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// Test this case belongs to.
    pub test: TestCase,
    /// Zero-based iteration index within the test.
    pub iteration: usize,
    /// Whether the case passed.
    pub passed: bool,
    /// Whether every guard region was intact after every call.
    pub guard_intact: bool,
    /// Failures observed, in order.
    pub failures: Vec<Failure>,
}

impl CaseOutcome {
    /// A passing case with no failures recorded yet.
    #[must_use]
    pub fn new(test: TestCase, iteration: usize) -> Self {
        Self { test, iteration, passed: true, guard_intact: true, failures: Vec::new() }
    }

    /// Records a test failure. Infrastructure errors carry no
    /// [`FailureKind`] and are ignored; callers propagate those instead.
    pub fn record(&mut self, error: &HarnessError) {
        let Some(kind) = error.kind() else {
            return;
        };
        if kind == FailureKind::MemorySafetyViolation {
            self.guard_intact = false;
        }
        self.passed = false;
        self.failures.push(Failure { kind, detail: error.to_string() });
    }

    /// Whether a failure of `kind` was recorded.
    #[must_use]
    pub fn has_failure(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|failure| failure.kind == kind)
    }
}

/// Totals over a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of cases run.
    pub total: usize,
    /// Cases that passed.
    pub passed: usize,
    /// Cases that failed.
    pub failed: usize,
    /// Failure count per classification.
    pub failures_by_kind: BTreeMap<FailureKind, usize>,
}

impl RunSummary {
    /// Pass rate as a percentage.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { (self.passed as f64 / self.total as f64) * 100.0 }
    }
}

/// Complete record of one harness run against one scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scheme name.
    pub scheme: String,
    /// Scheme kind.
    pub kind: SchemeKind,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-case verdicts in execution order.
    pub cases: Vec<CaseOutcome>,
    /// Whether a fatal failure stopped the run early.
    pub halted: bool,
}

impl RunReport {
    /// Starts an empty report.
    #[must_use]
    pub fn new(scheme: impl Into<String>, kind: SchemeKind) -> Self {
        Self { scheme: scheme.into(), kind, started_at: Utc::now(), cases: Vec::new(), halted: false }
    }

    /// Appends a case verdict.
    pub fn push(&mut self, outcome: CaseOutcome) {
        self.cases.push(outcome);
    }

    /// Cases belonging to `test`.
    pub fn cases_for(&self, test: TestCase) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(move |case| case.test == test)
    }

    /// Whether every case passed and the run was not halted.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.halted && self.cases.iter().all(|case| case.passed)
    }

    /// Aggregated totals.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let passed = self.cases.iter().filter(|case| case.passed).count();
        let mut failures_by_kind = BTreeMap::new();
        for failure in self.cases.iter().flat_map(|case| &case.failures) {
            *failures_by_kind.entry(failure.kind).or_insert(0) += 1;
        }
        RunSummary {
            total: self.cases.len(),
            passed,
            failed: self.cases.len() - passed,
            failures_by_kind,
        }
    }

    /// Human-readable report.
    #[must_use]
    pub fn render_text(&self) -> String {
        let summary = self.summary();
        let mut report = String::new();

        report.push_str("=== Conformance Report ===\n\n");
        report.push_str(&format!("Scheme: {} ({})\n", self.scheme, self.kind));
        report.push_str(&format!("Started: {}\n\n", self.started_at.to_rfc3339()));

        report.push_str("Summary:\n");
        report.push_str(&format!("  Total cases: {}\n", summary.total));
        report.push_str(&format!("  Passed: {}\n", summary.passed));
        report.push_str(&format!("  Failed: {}\n", summary.failed));
        report.push_str(&format!("  Success rate: {:.2}%\n", summary.pass_rate()));
        if self.halted {
            report.push_str("  Halted: yes\n");
        }

        if summary.failed > 0 {
            report.push_str("\nFailed Cases:\n");
            for case in self.cases.iter().filter(|case| !case.passed) {
                for failure in &case.failures {
                    report.push_str(&format!(
                        "  {} #{}: [{:?}] {}\n",
                        case.test, case.iteration, failure.kind, failure.detail
                    ));
                }
            }
        }

        report
    }

    /// Report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scheme::Operation;

    fn sample() -> RunReport {
        let mut report = RunReport::new("ML-KEM-512", SchemeKind::Kem);
        report.push(CaseOutcome::new(TestCase::PositiveAgreement, 0));

        let mut broken = CaseOutcome::new(TestCase::PositiveAgreement, 1);
        broken.record(&HarnessError::AgreementMismatch { iteration: 1 });
        broken.record(&HarnessError::MemorySafetyViolation {
            operation: Operation::Decapsulate,
            buffers: vec!["shared secret"],
        });
        report.push(broken);

        let mut robust = CaseOutcome::new(TestCase::InvalidCiphertext, 0);
        robust.record(&HarnessError::RobustnessFailure { corrupted: "ciphertext", iteration: 0 });
        report.push(robust);
        report
    }

    #[test]
    fn test_record_sets_flags() {
        let report = sample();
        let broken = &report.cases[1];
        assert!(!broken.passed);
        assert!(!broken.guard_intact);
        assert!(broken.has_failure(FailureKind::AgreementMismatch));
        assert!(broken.has_failure(FailureKind::MemorySafetyViolation));

        let robust = &report.cases[2];
        assert!(robust.guard_intact, "robustness failure is not a guard failure");
    }

    #[test]
    fn test_record_ignores_infrastructure_errors() {
        let mut case = CaseOutcome::new(TestCase::InvalidSecretKey, 0);
        case.record(&HarnessError::Output(std::io::Error::other("closed")));
        assert!(case.passed);
        assert!(case.failures.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.failures_by_kind.get(&FailureKind::AgreementMismatch), Some(&1));
        assert_eq!(summary.failures_by_kind.get(&FailureKind::RobustnessFailure), Some(&1));
        assert!((summary.pass_rate() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_passed_respects_halt() {
        let mut report = RunReport::new("ML-DSA-44", SchemeKind::Signature);
        report.push(CaseOutcome::new(TestCase::SignatureVector { message_len: 0 }, 0));
        assert!(report.all_passed());
        report.halted = true;
        assert!(!report.all_passed());
    }

    #[test]
    fn test_render_text_lists_failures() {
        let text = sample().render_text();
        assert!(text.contains("Scheme: ML-KEM-512 (KEM)"));
        assert!(text.contains("Failed: 2"));
        assert!(text.contains("positive agreement #1: [AgreementMismatch]"));
        assert!(text.contains("invalid ciphertext #0: [RobustnessFailure]"));
        assert!(!text.contains("Halted"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"positive_agreement\""));
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_empty_summary_rate() {
        let report = RunReport::new("empty", SchemeKind::Kem);
        assert_eq!(report.summary().pass_rate(), 0.0);
        assert!(report.all_passed());
    }
}
