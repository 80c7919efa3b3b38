//! Compute instance types as observed from the cloud provider.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::domain::error::InstanceError;

/// Default Amazon Linux AMI for the demo web server.
pub const DEFAULT_AMI: &str = "ami-0fad7378adf284ce0";

/// Default instance size.
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// User data run by cloud-init on first boot: installs and starts Apache.
pub const WEB_SERVER_USER_DATA: &str = "#!/bin/bash
yum -y update
yum -y install httpd
systemctl enable httpd
systemctl start httpd
";

#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant
static INSTANCE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^i-(?:[0-9a-f]{8}|[0-9a-f]{17})$").unwrap());

#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant
static SECURITY_GROUP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sg-(?:[0-9a-f]{8}|[0-9a-f]{17})$").unwrap());

/// Lifecycle state reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
    Unknown,
}

impl InstanceState {
    /// Map an EC2 state name (`"pending"`, `"shutting-down"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one instance.
///
/// `address` stays `None` until the provider assigns a public IPv4 address;
/// the only way to observe the transition is to describe the instance again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub id: String,
    /// Value of the `Name` tag, if any.
    pub name: Option<String>,
    pub state: InstanceState,
    pub address: Option<String>,
    pub launched_at: Option<DateTime<Utc>>,
}

/// How a launch refers to its security group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityGroupRef {
    Id(String),
    Name(String),
}

impl SecurityGroupRef {
    /// Treat input in EC2 ID format (`sg-` + 8 or 17 hex digits) as an ID,
    /// anything else as a group name.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is blank.
    pub fn parse(raw: &str) -> Result<Self, InstanceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InstanceError::EmptySecurityGroup);
        }
        if SECURITY_GROUP_ID.is_match(raw) {
            Ok(Self::Id(raw.to_owned()))
        } else {
            Ok(Self::Name(raw.to_owned()))
        }
    }
}

/// Everything needed for one `RunInstances` call.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub ami: String,
    pub instance_type: String,
    /// EC2 key pair name (derived from the credential file stem).
    pub key_name: String,
    pub security_group: SecurityGroupRef,
    /// Value for the `Name` tag.
    pub name: String,
    pub user_data: String,
}

/// Validate an EC2 instance ID.
///
/// # Errors
///
/// Returns [`InstanceError::InvalidId`] if the ID is not `i-` followed by 8
/// or 17 lowercase hex digits.
pub fn validate_instance_id(id: &str) -> Result<(), InstanceError> {
    if INSTANCE_ID.is_match(id) {
        Ok(())
    } else {
        Err(InstanceError::InvalidId(id.to_owned()))
    }
}

/// Validate the `Name` tag for a new instance.
///
/// # Errors
///
/// Returns [`InstanceError::EmptyName`] for a blank name.
pub fn validate_instance_name(name: &str) -> Result<(), InstanceError> {
    if name.trim().is_empty() {
        return Err(InstanceError::EmptyName);
    }
    Ok(())
}
