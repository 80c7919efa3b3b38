//! Scripted port doubles for the readiness pipeline.
//!
//! Each double replays a queue of canned responses and records every call so
//! tests can assert exact attempt counts.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use ec2_webserver::application::ports::{CloudProvider, LocalPayload, PayloadSource, RemoteShell};
use ec2_webserver::domain::{Instance, InstanceState, LaunchRequest, RemoteTarget};
use tokio_util::sync::CancellationToken;

use crate::helpers::output;

// ── Provider ─────────────────────────────────────────────────────────────────

/// One canned `describe_instance` response.
pub enum Describe {
    NoAddress,
    Address(&'static str),
    Fail(&'static str),
    /// No address, and the instance is in this state.
    Gone(InstanceState),
}

/// Replays `describe_instance` responses; reports no address once drained.
#[derive(Default)]
pub struct ScriptedProvider {
    script: RefCell<VecDeque<Describe>>,
    pub describe_calls: Cell<u32>,
    /// Cancelled when `describe_calls` reaches the paired count.
    cancel_at: Option<(u32, CancellationToken)>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Describe>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Address appears on the `n`th describe call.
    pub fn address_after(misses: usize, address: &'static str) -> Self {
        let mut script: Vec<Describe> = (0..misses).map(|_| Describe::NoAddress).collect();
        script.push(Describe::Address(address));
        Self::new(script)
    }

    pub fn cancelling_at(mut self, call: u32, token: CancellationToken) -> Self {
        self.cancel_at = Some((call, token));
        self
    }
}

impl CloudProvider for ScriptedProvider {
    async fn launch_instance(&self, _: &LaunchRequest) -> Result<Instance> {
        anyhow::bail!("launch not expected in this test")
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance> {
        let calls = self.describe_calls.get() + 1;
        self.describe_calls.set(calls);
        if let Some((at, token)) = &self.cancel_at {
            if calls == *at {
                token.cancel();
            }
        }

        let (state, address) = match self.script.borrow_mut().pop_front() {
            Some(Describe::Address(a)) => (InstanceState::Running, Some(a.to_owned())),
            Some(Describe::Fail(msg)) => anyhow::bail!("{msg}"),
            Some(Describe::Gone(state)) => (state, None),
            Some(Describe::NoAddress) | None => (InstanceState::Pending, None),
        };
        Ok(Instance {
            id: instance_id.to_owned(),
            name: None,
            state,
            address,
            launched_at: None,
        })
    }

    async fn list_instances(&self) -> Result<Vec<Instance>> {
        anyhow::bail!("list not expected in this test")
    }

    async fn terminate_instance(&self, _: &str) -> Result<()> {
        anyhow::bail!("terminate not expected in this test")
    }
}

// ── Shell ────────────────────────────────────────────────────────────────────

/// One canned remote result: an exit code, a transport failure, or a call
/// that never returns.
#[derive(Clone, Copy)]
pub enum Step {
    Exit(i32),
    Transport,
    Hang,
}

/// Replays scripted results per remote operation and records every call.
///
/// Drained queues fall back to: probe → 255, copy → 0, chmod → 0,
/// payload → 1.
#[derive(Default)]
pub struct ScriptedShell {
    probes: RefCell<VecDeque<Step>>,
    copies: RefCell<VecDeque<Step>>,
    chmods: RefCell<VecDeque<Step>>,
    runs: RefCell<VecDeque<Step>>,
    pub calls: RefCell<Vec<String>>,
    /// Cancelled when the number of calls reaches the paired count.
    cancel_at: Option<(usize, CancellationToken)>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probes(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.probes.borrow_mut().extend(steps);
        self
    }

    pub fn copies(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.copies.borrow_mut().extend(steps);
        self
    }

    pub fn chmods(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.chmods.borrow_mut().extend(steps);
        self
    }

    pub fn runs(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.runs.borrow_mut().extend(steps);
        self
    }

    pub fn cancelling_at(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((call, token));
        self
    }

    /// SSH succeeds immediately, staging succeeds.
    pub fn healthy() -> Self {
        Self::new().probes([Step::Exit(0)])
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        let calls = {
            let mut recorded = self.calls.borrow_mut();
            recorded.push(call);
            recorded.len()
        };
        if let Some((at, token)) = &self.cancel_at {
            if calls == *at {
                token.cancel();
            }
        }
    }

    async fn replay(
        queue: &RefCell<VecDeque<Step>>,
        fallback: i32,
        label: &str,
    ) -> Result<Output> {
        let step = queue.borrow_mut().pop_front().unwrap_or(Step::Exit(fallback));
        match step {
            Step::Exit(code) => Ok(output(code, label.as_bytes(), b"")),
            Step::Transport => anyhow::bail!("ssh timed out after 300s"),
            Step::Hang => std::future::pending().await,
        }
    }
}

impl RemoteShell for ScriptedShell {
    async fn exec(&self, _: &RemoteTarget, command: &str) -> Result<Output> {
        self.record(format!("exec {command}"));
        if command == "ls" {
            Self::replay(&self.probes, 255, "probe").await
        } else if command.starts_with("chmod ") {
            Self::replay(&self.chmods, 0, "chmod").await
        } else {
            Self::replay(&self.runs, 1, "httpd is not running").await
        }
    }

    async fn copy_to(&self, _: &RemoteTarget, _: &Path, remote: &str) -> Result<Output> {
        self.record(format!("copy {remote}"));
        Self::replay(&self.copies, 0, "copy").await
    }
}

// ── Payload ──────────────────────────────────────────────────────────────────

pub struct PayloadStub;

impl PayloadSource for PayloadStub {
    fn local_payload(&self) -> Result<LocalPayload> {
        Ok(LocalPayload::existing(PathBuf::from(
            "/tmp/check_webserver.sh",
        )))
    }
}
