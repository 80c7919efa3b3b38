//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{AppConfig, Instance, LaunchRequest, RemoteTarget};

// ── Cloud Provider Port ───────────────────────────────────────────────────────

/// Compute instance operations consumed from the cloud provider.
///
/// The provider owns instance state; callers only observe it by describing
/// the instance again.
#[allow(async_fn_in_trait)]
pub trait CloudProvider {
    /// Launch one instance and return its initial snapshot.
    async fn launch_instance(&self, request: &LaunchRequest) -> Result<Instance>;
    /// Fetch the current state of one instance.
    async fn describe_instance(&self, instance_id: &str) -> Result<Instance>;
    /// List all instances visible to the caller.
    async fn list_instances(&self) -> Result<Vec<Instance>>;
    /// Request termination of one instance.
    async fn terminate_instance(&self, instance_id: &str) -> Result<()>;
}

// ── Remote Shell Port ─────────────────────────────────────────────────────────

/// One-shot remote command execution and file copy.
///
/// Implementations return the captured process output even when the remote
/// side fails; `Err` is reserved for failures to run the local client at all.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` on the target and capture its output.
    async fn exec(&self, target: &RemoteTarget, command: &str) -> Result<Output>;
    /// Copy a local file to `remote` (relative to the login user's home).
    async fn copy_to(&self, target: &RemoteTarget, local: &Path, remote: &str) -> Result<Output>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Operator Input Port ───────────────────────────────────────────────────────

/// Yields the operator's next answer.
///
/// `Ok(None)` means no answer is available (non-interactive session or end
/// of input); callers must stop prompting.
pub trait InputSource {
    /// Ask for a line of text.
    fn ask(&self, prompt: &str) -> Result<Option<String>>;
    /// Ask a yes/no question. Non-interactive sources return `default`.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Local key file checks and permission changes.
pub trait KeyFileStore {
    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
    /// Narrow permissions so only the owner can read the file.
    fn restrict_to_owner_read(&self, path: &Path) -> Result<()>;
    /// Home directory used for `~` expansion.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// A payload file on local disk.
///
/// When the file lives in a temp directory, the directory is removed when
/// this value is dropped.
#[derive(Debug)]
pub struct LocalPayload {
    path: PathBuf,
    _dir: Option<tempfile::TempDir>,
}

impl LocalPayload {
    /// A file owned by the operator; nothing is removed on drop.
    #[must_use]
    pub fn existing(path: PathBuf) -> Self {
        Self { path, _dir: None }
    }

    /// `name` inside `dir`, removed together with `dir`.
    #[must_use]
    pub fn in_temp_dir(dir: tempfile::TempDir, name: &str) -> Self {
        Self {
            path: dir.path().join(name),
            _dir: Some(dir),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Supplies the health-check script pushed to the instance.
pub trait PayloadSource {
    /// Materialize the payload as a local file.
    fn local_payload(&self) -> Result<LocalPayload>;
}

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<AppConfig>;
    /// Persist the configuration.
    fn save(&self, config: &AppConfig) -> Result<()>;
    /// Path of the backing file.
    fn path(&self) -> Result<PathBuf>;
}
