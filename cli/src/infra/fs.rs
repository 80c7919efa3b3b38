//! Filesystem infrastructure — implements `KeyFileStore`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::KeyFileStore;

/// Production filesystem implementation of `KeyFileStore`.
pub struct LocalFs;

impl KeyFileStore for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn restrict_to_owner_read(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o400))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        #[cfg(not(unix))]
        {
            let mut perms = std::fs::metadata(path)
                .with_context(|| format!("reading metadata of {}", path.display()))?
                .permissions();
            perms.set_readonly(true);
            std::fs::set_permissions(path, perms)
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}
