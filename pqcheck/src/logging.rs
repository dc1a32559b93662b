//! Tracing initialisation for the pqcheck binary and embedders.
//!
//! Logs go to stderr so the status channel on stdout stays machine-readable.
//! Scheme buffers are never logged; only their lengths.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "pqcheck=info,pqcheck_harness=info";

/// Initialize tracing with an `RUST_LOG` filter and a compact stderr layer.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing_with_default(DEFAULT_FILTER)
}

/// Like [`init_tracing`], falling back to `default_filter` when `RUST_LOG`
/// is unset or invalid.
///
/// # Errors
///
/// Returns an error if `default_filter` does not parse or a global
/// subscriber is already installed.
pub fn init_tracing_with_default(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .try_init()?;

    info!("pqcheck logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_fails_without_panicking() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
