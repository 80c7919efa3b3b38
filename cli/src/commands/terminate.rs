//! `ec2-webserver terminate` — terminate one instance.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::InputSource;
use crate::application::services::instances;
use crate::domain::instance::validate_instance_id;

/// Arguments for the terminate command.
#[derive(Args)]
pub struct TerminateArgs {
    /// Instance to terminate (i-...)
    pub instance_id: String,
}

/// Run the terminate command.
///
/// # Errors
///
/// Returns an error if the ID is malformed or the termination fails.
pub async fn run(app: &AppContext, args: TerminateArgs) -> Result<ExitCode> {
    let id = args.instance_id.trim();
    validate_instance_id(id)?;

    if !app.non_interactive && !app.input().confirm(&format!("Terminate {id}?"), false)? {
        app.output.info("Cancelled. Pass --yes to terminate without a prompt.");
        return Ok(ExitCode::SUCCESS);
    }

    let config = app.config()?;
    let provider = app.ec2(&config).await;
    {
        let reporter = app.reporter();
        instances::terminate_instance(&provider, id, &reporter).await?;
    }
    app.renderer().render_terminated(id)?;
    Ok(ExitCode::SUCCESS)
}
