//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::instance::InstanceState;

// ── Credential errors ─────────────────────────────────────────────────────────

/// Errors raised while validating a private key path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Enter a path to a .pem file (got '{0}').")]
    WrongExtension(String),

    #[error("Key file '{0}' does not exist.")]
    NotFound(String),

    #[error("Key file '{0}' has no usable name.")]
    NoName(String),

    #[error("No key pair given. Pass one with --key <path>.")]
    Missing,
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors related to instance and security group references.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceError {
    #[error("Invalid instance ID '{0}': expected i- followed by 8 or 17 hex digits")]
    InvalidId(String),

    #[error("Instance name must not be empty.")]
    EmptyName,

    #[error("Security group must not be empty.")]
    EmptySecurityGroup,
}

// ── Readiness errors ──────────────────────────────────────────────────────────

/// Errors that end the readiness pipeline early.
///
/// Only the address wait can time out or find the instance gone; any stage
/// can be cancelled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("Instance {instance_id} has no public address after {attempts} attempts.")]
    AddressTimeout { instance_id: String, attempts: u32 },

    #[error("Instance {instance_id} is {state} and will never get a public address.")]
    InstanceGone {
        instance_id: String,
        state: InstanceState,
    },

    #[error("Cancelled while {stage}.")]
    Cancelled { stage: &'static str },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
