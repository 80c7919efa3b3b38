//! Remote readiness pipeline for a freshly launched instance.
//!
//! Address wait → SSH wait → payload staging → payload execution. Every
//! stage runs to completion before the next starts. The address wait can
//! fail the pipeline; later stages end in a reported outcome. Any stage
//! stops as soon as the cancellation token fires.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::future::Future;
use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};
use backon::{BackoffBuilder, ExponentialBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{CloudProvider, PayloadSource, ProgressReporter, RemoteShell};
use crate::domain::{
    AddressWait, AppConfig, Credential, InstanceState, ReadinessError, RemoteTarget, RetryBudget,
    SshRetryPolicy,
};

/// Trivial command used to probe whether SSH accepts commands.
pub const PROBE_COMMAND: &str = "ls";

/// File name of the health check in the login user's home directory.
pub const REMOTE_PAYLOAD: &str = "check_webserver.sh";

const ADDRESS_STAGE: &str = "waiting for a public address";
const SSH_STAGE: &str = "waiting for SSH";
const STAGING_STAGE: &str = "copying the health check";
const EXEC_STAGE: &str = "running the health check";

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// How the SSH readiness wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshReadiness {
    /// A probe exited 0.
    Ready { attempts: u32 },
    /// The attempt ceiling was reached.
    TimedOut { attempts: u32, output: String },
    /// The retry policy refused to retry a failed probe.
    Rejected {
        attempts: u32,
        code: Option<i32>,
        output: String,
    },
}

impl SshReadiness {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts }
            | Self::TimedOut { attempts, .. }
            | Self::Rejected { attempts, .. } => *attempts,
        }
    }
}

/// Result of copying the payload and marking it executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadStaging {
    Staged,
    CopyFailed { output: String },
    ChmodFailed { output: String },
}

/// Result of running the payload on the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Verified { attempts: u32, output: String },
    Unverified { attempts: u32, output: String },
}

/// Terminal state of the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// The health check ran and exited 0.
    Verified,
    /// SSH never became ready and nothing after it succeeded.
    Degraded,
    /// SSH worked but staging or every payload run failed.
    Unverified,
}

/// Everything the pipeline observed, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    pub instance_id: String,
    pub address: String,
    pub ssh: SshReadiness,
    pub staging: PayloadStaging,
    /// `None` when staging failed and the payload never ran.
    pub execution: Option<ExecutionOutcome>,
}

impl ReadinessReport {
    #[must_use]
    pub fn state(&self) -> PipelineState {
        match (&self.execution, self.ssh.is_ready()) {
            (Some(ExecutionOutcome::Verified { .. }), _) => PipelineState::Verified,
            (Some(ExecutionOutcome::Unverified { .. }), _) | (None, true) => {
                PipelineState::Unverified
            }
            (None, false) => PipelineState::Degraded,
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Budgets and policy for one pipeline run.
#[derive(Debug, Clone)]
pub struct ReadinessOptions {
    /// Login user on the instance.
    pub user: String,
    pub address_wait: AddressWait,
    pub ssh_attempts: u32,
    pub ssh_policy: SshRetryPolicy,
    pub exec_budget: RetryBudget,
}

impl From<&AppConfig> for ReadinessOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            user: config.ssh.user.clone(),
            address_wait: config.address_wait(),
            ssh_attempts: config.ssh.max_attempts,
            ssh_policy: config.retry_policy(),
            exec_budget: config.exec_budget(),
        }
    }
}

/// Ports the pipeline talks to.
pub struct PipelinePorts<'a, P, S, L, R> {
    pub provider: &'a P,
    pub shell: &'a S,
    pub payload: &'a L,
    pub reporter: &'a R,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the full readiness pipeline against `instance_id`.
///
/// # Errors
///
/// Returns [`ReadinessError`] if no address appears within the address wait
/// budget, the instance is gone, or `cancel` fires during any stage. Returns
/// an error if the payload cannot be materialized locally. SSH, staging and
/// execution failures are reported in the returned [`ReadinessReport`]
/// instead.
pub async fn verify_instance<P, S, L, R>(
    ports: &PipelinePorts<'_, P, S, L, R>,
    instance_id: &str,
    credential: &Credential,
    opts: &ReadinessOptions,
    cancel: &CancellationToken,
) -> Result<ReadinessReport>
where
    P: CloudProvider,
    S: RemoteShell,
    L: PayloadSource,
    R: ProgressReporter,
{
    let reporter = ports.reporter;

    reporter.step(&format!("waiting for {instance_id} to get a public address..."));
    let address = wait_for_address(
        ports.provider,
        instance_id,
        &opts.address_wait,
        cancel,
        reporter,
    )
    .await?;
    reporter.success(&format!("{instance_id} has public address {address}"));

    let target = RemoteTarget {
        user: opts.user.clone(),
        address: address.clone(),
        key_path: credential.path.clone(),
    };

    reporter.step("waiting for SSH...");
    let ssh = wait_for_ssh(
        ports.shell,
        &target,
        opts.ssh_attempts,
        opts.ssh_policy,
        cancel,
        reporter,
    )
    .await?;

    let payload = ports
        .payload
        .local_payload()
        .context("preparing health check payload")?;

    let staging = stage_payload(
        ports.shell,
        &target,
        payload.path(),
        REMOTE_PAYLOAD,
        cancel,
        reporter,
    )
    .await?;
    let execution = if staging == PayloadStaging::Staged {
        Some(
            run_payload(
                ports.shell,
                &target,
                REMOTE_PAYLOAD,
                &opts.exec_budget,
                cancel,
                reporter,
            )
            .await?,
        )
    } else {
        None
    };

    let report = ReadinessReport {
        instance_id: instance_id.to_owned(),
        address,
        ssh,
        staging,
        execution,
    };
    info!(instance_id, state = ?report.state(), "readiness pipeline finished");
    Ok(report)
}

/// Describe the instance until it has a public address.
///
/// Describe errors are reported and count as failed attempts. Delays grow
/// exponentially from `initial_delay` up to `max_delay`.
///
/// # Errors
///
/// Returns [`ReadinessError::AddressTimeout`] after `max_attempts` failed
/// attempts, [`ReadinessError::InstanceGone`] once the instance is shutting
/// down or terminated, and [`ReadinessError::Cancelled`] when `cancel` fires.
pub async fn wait_for_address(
    provider: &impl CloudProvider,
    instance_id: &str,
    wait: &AddressWait,
    cancel: &CancellationToken,
    reporter: &impl ProgressReporter,
) -> Result<String, ReadinessError> {
    let mut delays = ExponentialBuilder::default()
        .with_min_delay(wait.initial_delay)
        .with_max_delay(wait.max_delay)
        .with_factor(2.0)
        .with_max_times(usize::try_from(wait.max_attempts).unwrap_or(usize::MAX))
        .build();

    for attempt in 1..=wait.max_attempts {
        match unless_cancelled(cancel, ADDRESS_STAGE, provider.describe_instance(instance_id))
            .await?
        {
            Ok(instance) => {
                if let Some(address) = instance.address {
                    debug!(instance_id, attempt, %address, "public address assigned");
                    return Ok(address);
                }
                if matches!(
                    instance.state,
                    InstanceState::ShuttingDown | InstanceState::Terminated
                ) {
                    return Err(ReadinessError::InstanceGone {
                        instance_id: instance_id.to_owned(),
                        state: instance.state,
                    });
                }
                debug!(instance_id, attempt, state = %instance.state, "no public address yet");
            }
            Err(e) => {
                warn!(instance_id, attempt, error = %e, "describe instance failed");
                reporter.warn(&format!("could not query {instance_id}: {e:#}"));
            }
        }

        if attempt == wait.max_attempts {
            break;
        }
        let delay = delays.next().unwrap_or(wait.max_delay);
        unless_cancelled(cancel, ADDRESS_STAGE, tokio::time::sleep(delay)).await?;
    }

    Err(ReadinessError::AddressTimeout {
        instance_id: instance_id.to_owned(),
        attempts: wait.max_attempts,
    })
}

/// Probe SSH back-to-back until a probe succeeds or the ceiling is hit.
///
/// Per-attempt latency is bounded by ssh's own connect timeout; there is no
/// sleep between attempts. Reaching the ceiling takes priority over the
/// retry policy.
///
/// # Errors
///
/// Returns [`ReadinessError::Cancelled`] when `cancel` fires; an in-flight
/// probe is dropped.
pub async fn wait_for_ssh(
    shell: &impl RemoteShell,
    target: &RemoteTarget,
    max_attempts: u32,
    policy: SshRetryPolicy,
    cancel: &CancellationToken,
    reporter: &impl ProgressReporter,
) -> Result<SshReadiness, ReadinessError> {
    let mut last_output = String::new();

    for attempt in 1..=max_attempts {
        let probe = unless_cancelled(cancel, SSH_STAGE, shell.exec(target, PROBE_COMMAND)).await?;
        let (code, output) = match probe {
            Ok(out) => (out.status.code(), captured(&out)),
            Err(e) => (None, format!("{e:#}")),
        };

        if code == Some(0) {
            reporter.success(&format!("SSH ready after {attempt} attempt(s)"));
            return Ok(SshReadiness::Ready { attempts: attempt });
        }
        debug!(address = %target.address, attempt, ?code, "SSH not ready");

        if attempt == max_attempts {
            last_output = output;
            break;
        }
        if !policy.should_retry(code) {
            reporter.warn(&format!(
                "SSH failed with {} and will not be retried: {output}",
                describe_code(code)
            ));
            return Ok(SshReadiness::Rejected {
                attempts: attempt,
                code,
                output,
            });
        }
        last_output = output;
    }

    reporter.warn(&format!(
        "SSH is taking too long ({max_attempts} attempts); continuing anyway"
    ));
    Ok(SshReadiness::TimedOut {
        attempts: max_attempts,
        output: last_output,
    })
}

/// Copy the payload, then mark it executable. Stops at the first failure.
///
/// # Errors
///
/// Returns [`ReadinessError::Cancelled`] when `cancel` fires.
pub async fn stage_payload(
    shell: &impl RemoteShell,
    target: &RemoteTarget,
    local: &Path,
    remote: &str,
    cancel: &CancellationToken,
    reporter: &impl ProgressReporter,
) -> Result<PayloadStaging, ReadinessError> {
    reporter.step("copying health check to the instance...");
    let copy = unless_cancelled(cancel, STAGING_STAGE, shell.copy_to(target, local, remote)).await?;
    if let Err(output) = succeeded(copy) {
        reporter.warn(&format!("copy failed: {output}"));
        return Ok(PayloadStaging::CopyFailed { output });
    }

    let chmod_command = format!("chmod 700 {remote}");
    let chmod = unless_cancelled(cancel, STAGING_STAGE, shell.exec(target, &chmod_command)).await?;
    if let Err(output) = succeeded(chmod) {
        reporter.warn(&format!("chmod failed: {output}"));
        return Ok(PayloadStaging::ChmodFailed { output });
    }

    reporter.success("health check staged");
    Ok(PayloadStaging::Staged)
}

/// Run the staged payload once, then retry within `budget` if it failed.
///
/// Every retry waits `budget.delay` first. Any non-zero status is retried
/// the same way.
///
/// # Errors
///
/// Returns [`ReadinessError::Cancelled`] when `cancel` fires, whether a run
/// or a delay is in progress.
pub async fn run_payload(
    shell: &impl RemoteShell,
    target: &RemoteTarget,
    remote: &str,
    budget: &RetryBudget,
    cancel: &CancellationToken,
    reporter: &impl ProgressReporter,
) -> Result<ExecutionOutcome, ReadinessError> {
    let command = invoke_command(remote);

    reporter.step("running health check...");
    let first = unless_cancelled(cancel, EXEC_STAGE, shell.exec(target, &command)).await?;
    let mut output = match succeeded(first) {
        Ok(output) => {
            reporter.success("health check passed");
            return Ok(ExecutionOutcome::Verified {
                attempts: 1,
                output,
            });
        }
        Err(output) => output,
    };

    reporter.warn(&format!(
        "health check failed, retrying up to {} more time(s)",
        budget.max_attempts
    ));
    for retry in 1..=budget.max_attempts {
        unless_cancelled(cancel, EXEC_STAGE, tokio::time::sleep(budget.delay)).await?;
        let run = unless_cancelled(cancel, EXEC_STAGE, shell.exec(target, &command)).await?;
        match succeeded(run) {
            Ok(out) => {
                reporter.success("health check passed");
                return Ok(ExecutionOutcome::Verified {
                    attempts: retry + 1,
                    output: out,
                });
            }
            Err(out) => {
                debug!(retry, remaining = budget.max_attempts - retry, "health check still failing");
                output = out;
            }
        }
    }

    reporter.warn("health check did not pass in time");
    Ok(ExecutionOutcome::Unverified {
        attempts: budget.max_attempts + 1,
        output,
    })
}

// ── Private helpers ──────────────────────────────────────────────────────────

/// Await `fut` unless `cancel` fires first. A pending `fut` is dropped.
async fn unless_cancelled<T>(
    cancel: &CancellationToken,
    stage: &'static str,
    fut: impl Future<Output = T>,
) -> Result<T, ReadinessError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            warn!(stage, "cancelled");
            Err(ReadinessError::Cancelled { stage })
        }
        out = fut => Ok(out),
    }
}

fn invoke_command(remote: &str) -> String {
    if remote.starts_with('/') {
        remote.to_owned()
    } else {
        format!("./{remote}")
    }
}

/// Collapse a transport result into captured text, `Ok` only for exit 0.
fn succeeded(result: Result<Output>) -> Result<String, String> {
    match result {
        Ok(out) if out.status.success() => Ok(captured(&out)),
        Ok(out) => Err(captured(&out)),
        Err(e) => Err(format!("{e:#}")),
    }
}

fn captured(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        (out, "") => out.to_owned(),
        ("", err) => err.to_owned(),
        (out, err) => format!("{out}\n{err}"),
    }
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit status".to_owned(), |c| format!("exit status {c}"))
}
