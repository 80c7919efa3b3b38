//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credential;
pub mod error;
pub mod instance;
pub mod retry;
pub mod ssh;

pub use config::{AppConfig, validate_config_key, validate_config_value};
pub use credential::Credential;
pub use error::{ConfigError, CredentialError, InstanceError, ReadinessError};
pub use instance::{Instance, InstanceState, LaunchRequest, SecurityGroupRef};
pub use retry::{AddressWait, RetryBudget, SshRetryPolicy};
pub use ssh::RemoteTarget;
