//! Private key credential validation.
//!
//! Pure path logic only. Existence checks and the permission change live
//! behind the `KeyFileStore` port.

use std::path::{Path, PathBuf};

use crate::domain::error::CredentialError;

/// Extension a key pair file must carry.
pub const KEY_EXTENSION: &str = "pem";

/// A validated private key plus the EC2 key pair name derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Absolute or relative path to the `.pem` file, `~` already expanded.
    pub path: PathBuf,
    /// Key pair name as registered with EC2 (the file stem).
    pub name: String,
}

/// Expand a leading `~` to `home`. Other paths are returned unchanged.
#[must_use]
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    }
}

/// Check the extension and derive the key pair name from the file stem.
///
/// `keys/test.pem` yields `test`.
///
/// # Errors
///
/// Returns [`CredentialError::WrongExtension`] when the path does not end in
/// `.pem`, or [`CredentialError::NoName`] when the stem is empty.
pub fn key_name(path: &Path) -> Result<String, CredentialError> {
    let shown = path.display().to_string();
    if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
        return Err(CredentialError::WrongExtension(shown));
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(CredentialError::NoName(shown))
}
