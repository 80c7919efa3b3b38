//! Infrastructure implementation of the `RemoteShell` port over the OpenSSH
//! `ssh` and `scp` clients.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::{CommandRunner, RemoteShell};
use crate::domain::RemoteTarget;

/// Runs remote commands by shelling out to `ssh` and `scp`.
///
/// Host keys are not verified: every launch gets a fresh host key on a fresh
/// address, so there is nothing to pin against.
pub struct SshTransport<R> {
    runner: R,
    connect_timeout_secs: u64,
}

impl<R: CommandRunner> SshTransport<R> {
    #[must_use]
    pub fn new(runner: R, connect_timeout_secs: u64) -> Self {
        Self {
            runner,
            connect_timeout_secs,
        }
    }
}

impl<R: CommandRunner> RemoteShell for SshTransport<R> {
    async fn exec(&self, target: &RemoteTarget, command: &str) -> Result<Output> {
        let args = ssh_args(target, self.connect_timeout_secs, command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run("ssh", &refs).await
    }

    async fn copy_to(&self, target: &RemoteTarget, local: &Path, remote: &str) -> Result<Output> {
        let args = scp_args(target, self.connect_timeout_secs, local, remote);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run("scp", &refs).await
    }
}

fn common_options(target: &RemoteTarget, connect_timeout_secs: u64) -> Vec<String> {
    vec![
        "-i".to_owned(),
        target.key_path.to_string_lossy().into_owned(),
        "-o".to_owned(),
        "BatchMode=yes".to_owned(),
        "-o".to_owned(),
        "StrictHostKeyChecking=no".to_owned(),
        "-o".to_owned(),
        "UserKnownHostsFile=/dev/null".to_owned(),
        "-o".to_owned(),
        "LogLevel=ERROR".to_owned(),
        "-o".to_owned(),
        format!("ConnectTimeout={connect_timeout_secs}"),
    ]
}

/// Arguments for `ssh` running `command` on `target`.
#[must_use]
pub fn ssh_args(target: &RemoteTarget, connect_timeout_secs: u64, command: &str) -> Vec<String> {
    let mut args = common_options(target, connect_timeout_secs);
    args.push(target.destination());
    args.push(command.to_owned());
    args
}

/// Arguments for `scp` copying `local` to `remote` on `target`.
#[must_use]
pub fn scp_args(
    target: &RemoteTarget,
    connect_timeout_secs: u64,
    local: &Path,
    remote: &str,
) -> Vec<String> {
    let mut args = common_options(target, connect_timeout_secs);
    args.push(local.to_string_lossy().into_owned());
    args.push(target.remote_path(remote));
    args
}
