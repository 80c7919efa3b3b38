//! Infrastructure implementation of the `CloudProvider` port over the AWS
//! EC2 API.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::{InstanceType, ResourceType, Tag, TagSpecification};
use chrono::DateTime;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::ports::CloudProvider;
use crate::domain::{Instance, InstanceState, LaunchRequest, SecurityGroupRef};

/// A failed EC2 API call, classified by its error code.
#[derive(Debug, Error)]
pub enum Ec2Error {
    #[error("{action} failed: {message} ({code}){}", hint_suffix(.code))]
    Api {
        action: &'static str,
        code: String,
        message: String,
    },
    #[error("{action} failed: {detail}")]
    Transport { action: &'static str, detail: String },
}

fn hint_suffix(code: &str) -> String {
    hint_for_code(code).map_or_else(String::new, |h| format!("\n  hint: {h}"))
}

/// Operator hint for common EC2 error codes.
#[must_use]
pub fn hint_for_code(code: &str) -> Option<&'static str> {
    match code {
        "AuthFailure" | "UnauthorizedOperation" => {
            Some("check your AWS credentials (aws configure, AWS_PROFILE)")
        }
        "InvalidKeyPair.NotFound" => {
            Some("the key file name must match a key pair registered in this region")
        }
        "InvalidGroup.NotFound" | "InvalidGroupId.Malformed" => {
            Some("check the security group exists in this region")
        }
        "InvalidAMIID.NotFound" | "InvalidAMIID.Malformed" => {
            Some("AMI IDs are per region; set instance.ami for yours")
        }
        "InvalidInstanceID.NotFound" | "InvalidInstanceID.Malformed" => {
            Some("run 'ec2-webserver list' to see known instances")
        }
        _ => None,
    }
}

/// Build an [`Ec2Error`] from SDK error metadata.
///
/// `fallback` is used when the service returned no error code (network or
/// credential resolution failures).
#[must_use]
pub fn classify(
    action: &'static str,
    code: Option<&str>,
    message: Option<&str>,
    fallback: String,
) -> Ec2Error {
    match code {
        Some(code) => Ec2Error::Api {
            action,
            code: code.to_owned(),
            message: message.unwrap_or("no message").to_owned(),
        },
        None => Ec2Error::Transport {
            action,
            detail: fallback,
        },
    }
}

fn sdk_error<E>(action: &'static str, err: &E) -> Ec2Error
where
    E: ProvideErrorMetadata + std::error::Error,
{
    classify(
        action,
        err.code(),
        err.message(),
        aws_sdk_ec2::error::DisplayErrorContext(err).to_string(),
    )
}

/// Production `CloudProvider` backed by `aws-sdk-ec2`.
pub struct Ec2Provider {
    client: aws_sdk_ec2::Client,
}

impl Ec2Provider {
    /// Load AWS configuration from the environment, shared config files and
    /// instance roles. `region` overrides the resolved region when set.
    pub async fn load(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        let config = loader.load().await;
        debug!(region = ?config.region(), "AWS configuration loaded");
        Self {
            client: aws_sdk_ec2::Client::new(&config),
        }
    }
}

impl CloudProvider for Ec2Provider {
    async fn launch_instance(&self, request: &LaunchRequest) -> Result<Instance> {
        let user_data = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            request.user_data.as_bytes(),
        );

        let mut call = self
            .client
            .run_instances()
            .image_id(&request.ami)
            .instance_type(InstanceType::from(request.instance_type.as_str()))
            .key_name(&request.key_name)
            .min_count(1)
            .max_count(1)
            .user_data(user_data)
            .tag_specifications(
                TagSpecification::builder()
                    .resource_type(ResourceType::Instance)
                    .tags(Tag::builder().key("Name").value(&request.name).build())
                    .build(),
            );
        call = match &request.security_group {
            SecurityGroupRef::Id(id) => call.security_group_ids(id),
            SecurityGroupRef::Name(name) => call.security_groups(name),
        };

        let response = call
            .send()
            .await
            .map_err(|e| sdk_error("RunInstances", &e))?;
        let launched = response
            .instances()
            .first()
            .and_then(to_instance)
            .context("RunInstances returned no instance")?;
        info!(instance_id = %launched.id, ami = %request.ami, "RunInstances accepted");
        Ok(launched)
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance> {
        let response = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeInstances", &e))?;
        response
            .reservations()
            .iter()
            .flat_map(aws_sdk_ec2::types::Reservation::instances)
            .find_map(to_instance)
            .with_context(|| format!("instance {instance_id} not found"))
    }

    async fn list_instances(&self) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.describe_instances();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| sdk_error("DescribeInstances", &e))?;
            instances.extend(
                response
                    .reservations()
                    .iter()
                    .flat_map(aws_sdk_ec2::types::Reservation::instances)
                    .filter_map(to_instance),
            );
            match response.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_owned()),
                _ => break,
            }
        }
        debug!(count = instances.len(), "listed instances");
        Ok(instances)
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        self.client
            .terminate_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| sdk_error("TerminateInstances", &e))?;
        Ok(())
    }
}

/// Convert an SDK instance into the domain snapshot. Instances without an
/// ID are skipped.
#[must_use]
pub fn to_instance(raw: &aws_sdk_ec2::types::Instance) -> Option<Instance> {
    let id = raw.instance_id()?.to_owned();
    let state = raw
        .state()
        .and_then(|s| s.name())
        .map_or(InstanceState::Unknown, |n| InstanceState::from_name(n.as_str()));
    let name = raw
        .tags()
        .iter()
        .find(|t| t.key() == Some("Name"))
        .and_then(|t| t.value())
        .map(str::to_owned);
    let launched_at = raw
        .launch_time()
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()));

    Some(Instance {
        id,
        name,
        state,
        address: raw.public_ip_address().map(str::to_owned),
        launched_at,
    })
}
