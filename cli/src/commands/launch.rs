//! `ec2-webserver launch` — start a web server instance and verify it.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{credential, instances};
use crate::domain::SecurityGroupRef;
use crate::infra::fs::LocalFs;

/// Arguments for the launch command.
#[derive(Args)]
pub struct LaunchArgs {
    /// Private key file; its stem must match an EC2 key pair name
    #[arg(long, short)]
    pub key: Option<String>,

    /// Security group ID (sg-...) or name
    #[arg(long, short = 'g')]
    pub security_group: Option<String>,

    /// Value for the instance's Name tag
    #[arg(long, short)]
    pub name: Option<String>,

    /// Launch only; do not wait for the web server
    #[arg(long)]
    pub skip_check: bool,
}

/// Run the launch command.
///
/// # Errors
///
/// Returns an error if inputs are missing or invalid, the launch is
/// rejected, or no public address appears.
pub async fn run(app: &AppContext, args: LaunchArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let input = app.input();

    let (credential, security_group, name) = {
        let reporter = app.reporter();
        let credential =
            credential::import_key_pair(args.key.as_deref(), &input, &LocalFs, &reporter)?;
        let security_group = SecurityGroupRef::parse(&instances::value_or_prompt(
            args.security_group.as_deref(),
            &input,
            "Security group (ID or name)",
            "security group",
        )?)?;
        let name = instances::value_or_prompt(
            args.name.as_deref(),
            &input,
            "Instance name",
            "instance name",
        )?;
        (credential, security_group, name)
    };

    let provider = app.ec2(&config).await;
    let request = instances::web_server_request(&config, &credential, security_group, &name);
    let instance = {
        let reporter = app.reporter();
        instances::launch_web_server(&provider, &request, &reporter).await?
    };

    if args.skip_check {
        app.renderer().render_launched(&instance)?;
        return Ok(ExitCode::SUCCESS);
    }

    super::verify(app, &provider, &config, &instance.id, &credential).await
}
