//! Diagnostic logging setup.
//!
//! Operator-facing output goes through `crate::output`; this module only
//! wires `tracing` events to stderr for troubleshooting.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`,
/// `ec2_webserver=trace`).
pub const LOG_ENV: &str = "EC2WS_LOG";

/// Filter used when `EC2WS_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from a raw directive string.
#[must_use]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let directives = std::env::var(LOG_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
