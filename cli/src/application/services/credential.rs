//! Application service — key pair import.
//!
//! Resolves a private key path, re-prompting the operator until the path
//! names an existing `.pem` file, then narrows its permissions.

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::{InputSource, KeyFileStore, ProgressReporter};
use crate::domain::credential::{expand_home, key_name};
use crate::domain::{Credential, CredentialError};

/// Prompt shown when asking for a key path.
pub const KEY_PROMPT: &str = "Path to your key pair (.pem)";

/// Validate one candidate path without side effects.
///
/// # Errors
///
/// Returns a [`CredentialError`] when the extension is wrong or the file is
/// missing.
pub fn validate_key_path(
    raw: &str,
    fs: &impl KeyFileStore,
) -> Result<Credential, CredentialError> {
    let raw = raw.trim();
    let path = expand_home(raw, fs.home_dir().as_deref());
    let name = key_name(&path)?;
    if !fs.is_file(&path) {
        return Err(CredentialError::NotFound(path.display().to_string()));
    }
    Ok(Credential { path, name })
}

/// Import a key pair, starting from `initial` when given.
///
/// Invalid input is reported and the operator is asked again. Once a path
/// validates, its permissions are narrowed to owner-read-only.
///
/// # Errors
///
/// Returns the last validation error when the input source runs dry, or an
/// error if the permission change fails.
pub fn import_key_pair(
    initial: Option<&str>,
    input: &impl InputSource,
    fs: &impl KeyFileStore,
    reporter: &impl ProgressReporter,
) -> Result<Credential> {
    let mut candidate = initial.map(str::to_owned);
    let mut last_error = CredentialError::Missing;

    loop {
        let raw = match candidate.take() {
            Some(raw) => raw,
            None => match input.ask(KEY_PROMPT)? {
                Some(raw) => raw,
                None => return Err(last_error.into()),
            },
        };

        match validate_key_path(&raw, fs) {
            Ok(credential) => {
                fs.restrict_to_owner_read(&credential.path).with_context(|| {
                    format!("restricting permissions on {}", credential.path.display())
                })?;
                debug!(path = %credential.path.display(), name = %credential.name, "key pair imported");
                reporter.success(&format!(
                    "{} links to key pair '{}'",
                    credential.path.display(),
                    credential.name
                ));
                return Ok(credential);
            }
            Err(e) => {
                reporter.warn(&e.to_string());
                last_error = e;
            }
        }
    }
}
