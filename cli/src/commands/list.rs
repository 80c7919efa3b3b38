//! `ec2-webserver list` — show instances in the configured region.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::instances;

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the instances cannot be listed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let provider = app.ec2(&config).await;
    let found = instances::list_instances(&provider).await?;
    app.renderer().render_instances(&found)?;
    Ok(ExitCode::SUCCESS)
}
