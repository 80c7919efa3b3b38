//! Domain types and validators for tool configuration.
//!
//! Pure functions only. No I/O or async.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::instance::{DEFAULT_AMI, DEFAULT_INSTANCE_TYPE};
use crate::domain::retry::{
    AddressWait, DEFAULT_ADDRESS_ATTEMPTS, DEFAULT_EXEC_ATTEMPTS, DEFAULT_EXEC_DELAY,
    DEFAULT_SSH_ATTEMPTS, RetryBudget, SshRetryPolicy,
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "aws.region",
    "instance.ami",
    "instance.type",
    "ssh.user",
    "ssh.connect_timeout_secs",
    "ssh.retry_policy",
    "ssh.max_attempts",
    "exec.max_attempts",
    "exec.delay_secs",
    "address.max_attempts",
    "payload.local_path",
];

/// Keys that accept an empty value to fall back to the built-in default.
const CLEARABLE_KEYS: &[&str] = &["aws.region", "payload.local_path"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.ec2-webserver/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub aws: AwsConfig,
    pub instance: InstanceConfig,
    pub ssh: SshConfig,
    pub exec: ExecConfig,
    pub address: AddressConfig,
    pub payload: PayloadConfig,
}

/// AWS settings. `region: None` defers to the SDK's default provider chain.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AwsConfig {
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceConfig {
    pub ami: String,
    #[serde(rename = "type")]
    pub instance_type: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            ami: DEFAULT_AMI.to_string(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    /// Login user on the AMI.
    pub user: String,
    /// Passed to ssh as `ConnectTimeout`; bounds a single readiness probe.
    pub connect_timeout_secs: u64,
    /// `any-failure` or `sentinel`.
    pub retry_policy: String,
    pub max_attempts: u32,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: "ec2-user".to_string(),
            connect_timeout_secs: 10,
            retry_policy: SshRetryPolicy::default().as_str().to_string(),
            max_attempts: DEFAULT_SSH_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_EXEC_ATTEMPTS,
            delay_secs: DEFAULT_EXEC_DELAY.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AddressConfig {
    pub max_attempts: u32,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ADDRESS_ATTEMPTS,
        }
    }
}

/// Health-check payload. `local_path: None` uses the script built into the binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PayloadConfig {
    pub local_path: Option<String>,
}

impl AppConfig {
    /// The configured SSH retry policy.
    ///
    /// Loaded configs pass [`AppConfig::validate`] first, so the name always
    /// parses there.
    #[must_use]
    pub fn retry_policy(&self) -> SshRetryPolicy {
        self.ssh.retry_policy.parse().unwrap_or_default()
    }

    /// Check every value against the rules `set` enforces.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found, in key order.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.raw_entries() {
            validate_config_value(key, &value)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn exec_budget(&self) -> RetryBudget {
        RetryBudget::new(
            self.exec.max_attempts,
            Duration::from_secs(self.exec.delay_secs),
        )
    }

    #[must_use]
    pub fn address_wait(&self) -> AddressWait {
        AddressWait {
            max_attempts: self.address.max_attempts,
            ..AddressWait::default()
        }
    }

    /// Current value of every key, in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        self.raw_entries()
            .into_iter()
            .map(|(key, value)| match (key, value.is_empty()) {
                ("aws.region", true) => (key, "(sdk default)".to_string()),
                ("payload.local_path", true) => (key, "(built-in)".to_string()),
                _ => (key, value),
            })
            .collect()
    }

    /// Stored value of every key; unset optional keys are empty.
    fn raw_entries(&self) -> Vec<(&'static str, String)> {
        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("aws.region", or_empty(&self.aws.region)),
            ("instance.ami", self.instance.ami.clone()),
            ("instance.type", self.instance.instance_type.clone()),
            ("ssh.user", self.ssh.user.clone()),
            (
                "ssh.connect_timeout_secs",
                self.ssh.connect_timeout_secs.to_string(),
            ),
            ("ssh.retry_policy", self.ssh.retry_policy.clone()),
            ("ssh.max_attempts", self.ssh.max_attempts.to_string()),
            ("exec.max_attempts", self.exec.max_attempts.to_string()),
            ("exec.delay_secs", self.exec.delay_secs.to_string()),
            ("address.max_attempts", self.address.max_attempts.to_string()),
            ("payload.local_path", or_empty(&self.payload.local_path)),
        ]
    }

    /// Validate and apply one `key = value` assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        let optional = || (!value.is_empty()).then(|| value.to_string());
        match key {
            "aws.region" => self.aws.region = optional(),
            "instance.ami" => self.instance.ami = value.to_string(),
            "instance.type" => self.instance.instance_type = value.to_string(),
            "ssh.user" => self.ssh.user = value.to_string(),
            "ssh.connect_timeout_secs" => self.ssh.connect_timeout_secs = value.parse()?,
            "ssh.retry_policy" => self.ssh.retry_policy = value.to_string(),
            "ssh.max_attempts" => self.ssh.max_attempts = value.parse()?,
            "exec.max_attempts" => self.exec.max_attempts = value.parse()?,
            "exec.delay_secs" => self.exec.delay_secs = value.parse()?,
            "address.max_attempts" => self.address.max_attempts = value.parse()?,
            "payload.local_path" => self.payload.local_path = optional(),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };

    if value.is_empty() && !CLEARABLE_KEYS.contains(&key) {
        return Err(invalid("A value is required."));
    }

    match key {
        "ssh.retry_policy" => {
            if value.parse::<SshRetryPolicy>().is_err() {
                return Err(invalid(&format!(
                    "Valid values: {}",
                    SshRetryPolicy::NAMES.join(", ")
                )));
            }
        }
        "ssh.max_attempts" | "exec.max_attempts" | "address.max_attempts" => {
            match value.parse::<u32>() {
                Ok(n) if n >= 1 => {}
                _ => return Err(invalid("Expected a whole number of at least 1.")),
            }
        }
        "ssh.connect_timeout_secs" | "exec.delay_secs" => {
            if value.parse::<u64>().is_err() {
                return Err(invalid("Expected a whole number of seconds."));
            }
        }
        "instance.ami" => {
            if !value.starts_with("ami-") {
                return Err(invalid("AMI IDs start with 'ami-'."));
            }
        }
        _ => {}
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
