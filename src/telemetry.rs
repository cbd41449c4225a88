//! Logging setup for binaries and test harnesses embedding the engine

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (for example
/// `"planrun=info"`) is used.
///
/// # Errors
/// Returns error if the directive is invalid or a global subscriber is
/// already installed
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| Error::Config(format!("invalid log directive {default_directive:?}: {e}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Config(format!("tracing already initialized: {e}")))
}
