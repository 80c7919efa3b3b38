//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::readiness::{
    ExecutionOutcome, PayloadStaging, PipelineState, ReadinessReport, SshReadiness,
};
use crate::domain::{AppConfig, Instance};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("ec2-webserver {version}");
    }

    /// Render a newly launched instance.
    pub fn render_launched(&self, instance: &Instance) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv("Instance:", &instance.id);
        self.ctx
            .kv("Name:", instance.name.as_deref().unwrap_or("-"));
        self.ctx.kv("State:", instance.state.as_str());
        println!();
        self.ctx.info(&format!(
            "Check it later: ec2-webserver check {} --key <file.pem>",
            instance.id
        ));
    }

    /// Render the instance table.
    pub fn render_instances(&self, instances: &[Instance]) {
        if instances.is_empty() {
            if !self.ctx.quiet {
                println!("No instances found. Launch one: ec2-webserver launch");
            }
            return;
        }

        println!(
            "  {}",
            format!(
                "{:<20} {:<20} {:<14} {:<16} {}",
                "ID", "NAME", "STATE", "ADDRESS", "LAUNCHED"
            )
            .style(self.ctx.styles.header)
        );
        for instance in instances {
            println!("  {}", format_instance_row(instance));
        }
    }

    /// Render the outcome of the readiness pipeline.
    pub fn render_report(&self, report: &ReadinessReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv("Instance:", &report.instance_id);
        self.ctx.kv("Address: ", &report.address);
        self.ctx.kv("SSH:     ", &ssh_summary(&report.ssh));
        self.ctx.kv("Staging: ", staging_summary(&report.staging));
        self.ctx
            .kv("Health:  ", &execution_summary(report.execution.as_ref()));
        println!();

        match report.state() {
            PipelineState::Verified => self.ctx.success(&format!(
                "Web server verified at http://{}/",
                report.address
            )),
            state => {
                self.ctx.warn(state_label(state));
                if let Some(output) = last_output(report).filter(|o| !o.is_empty()) {
                    for line in output.lines().take(10) {
                        println!("    {}", line.style(self.ctx.styles.dim));
                    }
                }
            }
        }
    }

    /// Render a termination request.
    pub fn render_terminated(&self, instance_id: &str) {
        self.ctx.info(&format!("{instance_id} will be gone in a minute or two"));
    }

    /// Render a successful `config set`.
    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &AppConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for (key, value) in config.entries() {
            println!("  {:<26} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["EC2WS_CONFIG", "EC2WS_LOG", "AWS_PROFILE", "AWS_REGION", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
    }
}

/// One row of the instance table.
#[must_use]
pub fn format_instance_row(instance: &Instance) -> String {
    let launched = instance
        .launched_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
    format!(
        "{:<20} {:<20} {:<14} {:<16} {launched}",
        instance.id,
        instance.name.as_deref().unwrap_or("-"),
        instance.state.as_str(),
        instance.address.as_deref().unwrap_or("-"),
    )
}

/// One-line summary of the SSH wait.
#[must_use]
pub fn ssh_summary(ssh: &SshReadiness) -> String {
    match ssh {
        SshReadiness::Ready { attempts } => format!("ready after {attempts} attempt(s)"),
        SshReadiness::TimedOut { attempts, .. } => {
            format!("not ready after {attempts} attempts")
        }
        SshReadiness::Rejected { attempts, code, .. } => match code {
            Some(code) => format!("gave up on exit status {code} after {attempts} attempt(s)"),
            None => format!("gave up on a transport error after {attempts} attempt(s)"),
        },
    }
}

/// One-word summary of payload staging.
#[must_use]
pub fn staging_summary(staging: &PayloadStaging) -> &'static str {
    match staging {
        PayloadStaging::Staged => "staged",
        PayloadStaging::CopyFailed { .. } => "copy failed",
        PayloadStaging::ChmodFailed { .. } => "chmod failed",
    }
}

/// One-line summary of the health check.
#[must_use]
pub fn execution_summary(execution: Option<&ExecutionOutcome>) -> String {
    match execution {
        Some(ExecutionOutcome::Verified { attempts, .. }) => {
            format!("passed after {attempts} run(s)")
        }
        Some(ExecutionOutcome::Unverified { attempts, .. }) => {
            format!("failed {attempts} run(s)")
        }
        None => "not run".to_string(),
    }
}

/// Closing line for a pipeline that did not verify the server.
#[must_use]
pub fn state_label(state: PipelineState) -> &'static str {
    match state {
        PipelineState::Verified => "Web server verified",
        PipelineState::Degraded => "SSH never became ready; the web server was not checked",
        PipelineState::Unverified => "The web server could not be verified",
    }
}

/// Captured output of the step that decided the outcome.
fn last_output(report: &ReadinessReport) -> Option<&str> {
    match (&report.execution, &report.staging) {
        (Some(ExecutionOutcome::Unverified { output, .. }), _) => Some(output),
        (
            None,
            PayloadStaging::CopyFailed { output } | PayloadStaging::ChmodFailed { output },
        ) => Some(output),
        _ => match &report.ssh {
            SshReadiness::TimedOut { output, .. } | SshReadiness::Rejected { output, .. } => {
                Some(output)
            }
            SshReadiness::Ready { .. } => None,
        },
    }
}
