//! `ec2-webserver check` — run the readiness pipeline on an existing instance.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::credential;
use crate::domain::instance::validate_instance_id;
use crate::infra::fs::LocalFs;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Instance to check (i-...)
    pub instance_id: String,

    /// Private key file for the instance's key pair
    #[arg(long, short)]
    pub key: Option<String>,
}

/// Run the check command.
///
/// # Errors
///
/// Returns an error if the instance ID or key is invalid, or no public
/// address appears.
pub async fn run(app: &AppContext, args: CheckArgs) -> Result<ExitCode> {
    validate_instance_id(&args.instance_id)?;
    let config = app.config()?;

    let credential = {
        let reporter = app.reporter();
        credential::import_key_pair(args.key.as_deref(), &app.input(), &LocalFs, &reporter)?
    };

    let provider = app.ec2(&config).await;
    super::verify(app, &provider, &config, &args.instance_id, &credential).await
}
