//! JSON output helpers.
//!
//! Provides the machine-readable renderer and the error-object formatter
//! used by all `--json` code paths when a command fails.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::application::services::readiness::{
    ExecutionOutcome, PayloadStaging, PipelineState, ReadinessReport, SshReadiness,
};
use crate::domain::{AppConfig, Instance};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders domain types as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    fn print(value: &Value) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// Render the CLI version information.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(version: &str) -> Result<()> {
        Self::print(&json!({ "version": version }))
    }

    /// Render a newly launched instance.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_launched(instance: &Instance) -> Result<()> {
        Self::print(&serde_json::to_value(instance).context("serializing instance")?)
    }

    /// Render the instance list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_instances(instances: &[Instance]) -> Result<()> {
        Self::print(&json!({
            "instances": serde_json::to_value(instances).context("serializing instances")?,
        }))
    }

    /// Render the outcome of the readiness pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_report(report: &ReadinessReport) -> Result<()> {
        Self::print(&report_json(report))
    }

    /// Render a termination request.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_terminated(instance_id: &str) -> Result<()> {
        Self::print(&json!({ "instance_id": instance_id, "terminated": true }))
    }

    /// Render a successful `config set`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config_set(key: &str, value: &str) -> Result<()> {
        Self::print(&json!({ "key": key, "value": value }))
    }

    /// Render the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(config: &AppConfig, path: &Path) -> Result<()> {
        Self::print(&json!({
            "path": path.display().to_string(),
            "config": serde_json::to_value(config).context("serializing config")?,
        }))
    }
}

/// Machine-readable form of a readiness report.
#[must_use]
pub fn report_json(report: &ReadinessReport) -> Value {
    let ssh = match &report.ssh {
        SshReadiness::Ready { attempts } => json!({ "status": "ready", "attempts": attempts }),
        SshReadiness::TimedOut { attempts, output } => {
            json!({ "status": "timed-out", "attempts": attempts, "output": output })
        }
        SshReadiness::Rejected {
            attempts,
            code,
            output,
        } => json!({ "status": "rejected", "attempts": attempts, "code": code, "output": output }),
    };
    let staging = match &report.staging {
        PayloadStaging::Staged => json!({ "status": "staged" }),
        PayloadStaging::CopyFailed { output } => {
            json!({ "status": "copy-failed", "output": output })
        }
        PayloadStaging::ChmodFailed { output } => {
            json!({ "status": "chmod-failed", "output": output })
        }
    };
    let execution = match &report.execution {
        Some(ExecutionOutcome::Verified { attempts, output }) => {
            json!({ "status": "verified", "attempts": attempts, "output": output })
        }
        Some(ExecutionOutcome::Unverified { attempts, output }) => {
            json!({ "status": "unverified", "attempts": attempts, "output": output })
        }
        None => Value::Null,
    };

    json!({
        "instance_id": report.instance_id,
        "address": report.address,
        "state": state_name(report.state()),
        "ssh": ssh,
        "staging": staging,
        "execution": execution,
    })
}

/// Stable name of a pipeline state.
#[must_use]
pub fn state_name(state: PipelineState) -> &'static str {
    match state {
        PipelineState::Verified => "verified",
        PipelineState::Degraded => "degraded",
        PipelineState::Unverified => "unverified",
    }
}

/// Stable error code for the JSON error object.
#[must_use]
pub fn error_code(error: &anyhow::Error) -> &'static str {
    use crate::domain::{ConfigError, CredentialError, InstanceError, ReadinessError};

    if let Some(e) = error.downcast_ref::<ReadinessError>() {
        return match e {
            ReadinessError::AddressTimeout { .. } => "address-timeout",
            ReadinessError::InstanceGone { .. } => "instance-gone",
            ReadinessError::Cancelled { .. } => "cancelled",
        };
    }
    if error.downcast_ref::<CredentialError>().is_some() {
        "invalid-credential"
    } else if error.downcast_ref::<InstanceError>().is_some() {
        "invalid-instance"
    } else if error.downcast_ref::<ConfigError>().is_some() {
        "invalid-config"
    } else {
        "error"
    }
}
