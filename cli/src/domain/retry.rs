//! Retry budgets and the SSH retry predicate.

use std::str::FromStr;
use std::time::Duration;

/// Exit status `ssh` returns when it could not connect (refused, host not
/// up yet, timeout).
pub const SSH_NOT_READY_STATUS: i32 = 255;

/// Default attempt ceiling for the SSH readiness probe.
pub const DEFAULT_SSH_ATTEMPTS: u32 = 30;

/// Default retry budget for running the health-check payload.
pub const DEFAULT_EXEC_ATTEMPTS: u32 = 6;

/// Default delay between payload retries.
pub const DEFAULT_EXEC_DELAY: Duration = Duration::from_secs(10);

/// Default attempt ceiling for waiting on a public address.
pub const DEFAULT_ADDRESS_ATTEMPTS: u32 = 60;

/// A fixed attempt ceiling plus a fixed delay between attempts.
///
/// Only failed attempts consume the budget. Running out is reported to the
/// operator, never raised as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryBudget {
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Exponential backoff bounds for the public address wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWait {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for AddressWait {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ADDRESS_ATTEMPTS,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Which failed SSH probes are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SshRetryPolicy {
    /// Retry on any non-zero status or transport error.
    #[default]
    AnyFailure,
    /// Retry only on [`SSH_NOT_READY_STATUS`]; anything else ends the wait.
    Sentinel,
}

impl SshRetryPolicy {
    pub const NAMES: &'static [&'static str] = &["any-failure", "sentinel"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnyFailure => "any-failure",
            Self::Sentinel => "sentinel",
        }
    }

    /// Decide whether a failed probe is retried. `code` is `None` when ssh
    /// produced no exit status (spawn failure, runner timeout, signal).
    #[must_use]
    pub fn should_retry(self, code: Option<i32>) -> bool {
        match self {
            Self::AnyFailure => code != Some(0),
            Self::Sentinel => code == Some(SSH_NOT_READY_STATUS),
        }
    }
}

impl FromStr for SshRetryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-failure" => Ok(Self::AnyFailure),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(format!(
                "unknown retry policy '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            )),
        }
    }
}
