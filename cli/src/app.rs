//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the cross-cutting concerns (output mode, prompts,
//! configuration store) and builds the infrastructure adapters each command
//! needs from the loaded configuration.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::services::config_service;
use crate::domain::AppConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::ec2::Ec2Provider;
use crate::infra::input::TerminalInput;
use crate::infra::payload::EmbeddedPayload;
use crate::infra::ssh::SshTransport;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Environment variable that disables prompts, like `--yes`.
pub const YES_ENV: &str = "EC2WS_YES";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `EC2WS_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration persistence.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `EC2WS_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var(YES_ENV).is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for application services. Silent in JSON mode so
    /// stdout stays parseable.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        let reporter = TerminalReporter::new(&self.output);
        if self.is_json() {
            reporter.silenced()
        } else {
            reporter
        }
    }

    /// Operator prompts.
    #[must_use]
    pub fn input(&self) -> TerminalInput {
        TerminalInput::new(self.non_interactive)
    }

    /// Load the configuration file (defaults when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn config(&self) -> Result<AppConfig> {
        config_service::load_config(&self.config_store)
    }

    /// EC2 client for the configured region.
    pub async fn ec2(&self, config: &AppConfig) -> Ec2Provider {
        Ec2Provider::load(config.aws.region.as_deref()).await
    }

    /// ssh/scp transport honouring the configured connect timeout.
    #[must_use]
    pub fn ssh(&self, config: &AppConfig) -> SshTransport<TokioCommandRunner> {
        SshTransport::new(
            TokioCommandRunner::default(),
            config.ssh.connect_timeout_secs,
        )
    }

    /// Health-check payload, embedded unless overridden in the config.
    #[must_use]
    pub fn payload(&self, config: &AppConfig) -> EmbeddedPayload {
        EmbeddedPayload::new(config.payload.local_path.as_ref().map(PathBuf::from))
    }
}
