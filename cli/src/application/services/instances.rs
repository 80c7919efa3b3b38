//! Application service — instance launch, listing and termination.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{CloudProvider, InputSource, ProgressReporter};
use crate::domain::instance::{WEB_SERVER_USER_DATA, validate_instance_id, validate_instance_name};
use crate::domain::{AppConfig, Credential, Instance, LaunchRequest, SecurityGroupRef};

/// Build the launch request for the demo web server.
#[must_use]
pub fn web_server_request(
    config: &AppConfig,
    credential: &Credential,
    security_group: SecurityGroupRef,
    name: &str,
) -> LaunchRequest {
    LaunchRequest {
        ami: config.instance.ami.clone(),
        instance_type: config.instance.instance_type.clone(),
        key_name: credential.name.clone(),
        security_group,
        name: name.trim().to_owned(),
        user_data: WEB_SERVER_USER_DATA.to_owned(),
    }
}

/// Launch one web server instance.
///
/// # Errors
///
/// Returns an error if the name is blank or the provider rejects the launch.
pub async fn launch_web_server(
    provider: &impl CloudProvider,
    request: &LaunchRequest,
    reporter: &impl ProgressReporter,
) -> Result<Instance> {
    validate_instance_name(&request.name)?;
    reporter.step(&format!("launching instance '{}'...", request.name));
    let instance = provider
        .launch_instance(request)
        .await
        .context("launching instance")?;
    info!(instance_id = %instance.id, name = %request.name, "instance launched");
    reporter.success(&format!("instance {} has been created", instance.id));
    Ok(instance)
}

/// List instances, most useful first: running, then pending, then the rest.
///
/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn list_instances(provider: &impl CloudProvider) -> Result<Vec<Instance>> {
    use crate::domain::InstanceState;

    let mut instances = provider.list_instances().await.context("listing instances")?;
    instances.sort_by_key(|i| {
        let rank = match i.state {
            InstanceState::Running => 0,
            InstanceState::Pending => 1,
            _ => 2,
        };
        (rank, i.id.clone())
    });
    Ok(instances)
}

/// Terminate one instance.
///
/// # Errors
///
/// Returns an error if the ID is malformed or the provider call fails.
pub async fn terminate_instance(
    provider: &impl CloudProvider,
    instance_id: &str,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    validate_instance_id(instance_id)?;
    reporter.step(&format!("terminating {instance_id}..."));
    provider
        .terminate_instance(instance_id)
        .await
        .with_context(|| format!("terminating {instance_id}"))?;
    info!(instance_id, "termination requested");
    reporter.success(&format!("{instance_id} is shutting down"));
    Ok(())
}

/// Use `initial` when present, otherwise ask the operator.
///
/// Blank answers are asked again.
///
/// # Errors
///
/// Returns an error naming `what` when no answer is available.
pub fn value_or_prompt(
    initial: Option<&str>,
    input: &impl InputSource,
    prompt: &str,
    what: &str,
) -> Result<String> {
    if let Some(value) = initial.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(value.to_owned());
    }
    loop {
        match input.ask(prompt)? {
            Some(answer) if !answer.trim().is_empty() => return Ok(answer.trim().to_owned()),
            Some(_) => {}
            None => anyhow::bail!("No {what} given. Pass it on the command line."),
        }
    }
}
