//! Health-check payload — implements `PayloadSource`.
//!
//! The script is compiled into the binary and written to a private temp
//! directory on demand. A configured local file takes its place when set.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{LocalPayload, PayloadSource};

/// The bundled health-check script.
pub const CHECK_SCRIPT: &str = include_str!("../../assets/check_webserver.sh");

/// File name used when the bundled script is written out.
const SCRIPT_NAME: &str = "check_webserver.sh";

/// Supplies either the bundled script or an operator-provided replacement.
pub struct EmbeddedPayload {
    override_path: Option<PathBuf>,
}

impl EmbeddedPayload {
    #[must_use]
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self { override_path }
    }
}

impl PayloadSource for EmbeddedPayload {
    fn local_payload(&self) -> Result<LocalPayload> {
        if let Some(path) = &self.override_path {
            anyhow::ensure!(
                path.is_file(),
                "payload file {} does not exist",
                path.display()
            );
            return Ok(LocalPayload::existing(path.clone()));
        }

        let dir = tempfile::tempdir().context("creating temp dir for payload")?;
        let payload = LocalPayload::in_temp_dir(dir, SCRIPT_NAME);
        let path = payload.path();
        std::fs::write(path, CHECK_SCRIPT)
            .with_context(|| format!("writing {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(payload)
    }
}
