//! Command implementations

pub mod check;
pub mod config;
pub mod launch;
pub mod list;
pub mod terminate;
pub mod version;

use std::process::ExitCode;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::app::AppContext;
use crate::application::services::readiness::{
    self, PipelinePorts, PipelineState, ReadinessOptions,
};
use crate::domain::{AppConfig, Credential};
use crate::infra::ec2::Ec2Provider;

/// Token cancelled on the first Ctrl-C.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            child.cancel();
        }
    });
    token
}

/// Exit code for a finished pipeline.
#[must_use]
pub fn exit_code_for(state: PipelineState) -> ExitCode {
    match state {
        PipelineState::Verified => ExitCode::SUCCESS,
        PipelineState::Degraded | PipelineState::Unverified => ExitCode::FAILURE,
    }
}

/// Run the readiness pipeline against `instance_id` and render the report.
pub(crate) async fn verify(
    app: &AppContext,
    provider: &Ec2Provider,
    config: &AppConfig,
    instance_id: &str,
    credential: &Credential,
) -> Result<ExitCode> {
    let shell = app.ssh(config);
    let payload = app.payload(config);
    let opts = ReadinessOptions::from(config);
    let cancel = cancel_on_ctrl_c();

    let report = {
        let reporter = app.reporter();
        let ports = PipelinePorts {
            provider,
            shell: &shell,
            payload: &payload,
            reporter: &reporter,
        };
        readiness::verify_instance(&ports, instance_id, credential, &opts, &cancel).await?
    };

    app.renderer().render_report(&report)?;
    Ok(exit_code_for(report.state()))
}
