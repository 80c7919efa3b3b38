//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the EC2 API client, process
//! execution, ssh/scp, filesystem access, terminal prompts and the embedded
//! health-check payload.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod ec2;
pub mod fs;
pub mod input;
pub mod payload;
pub mod ssh;
