//! Remote host addressing for ssh and scp.

use std::path::PathBuf;

/// Where and as whom remote commands run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// Login user, e.g. `ec2-user`.
    pub user: String,
    /// Public IPv4 address of the instance.
    pub address: String,
    /// Private key passed to ssh with `-i`.
    pub key_path: PathBuf,
}

impl RemoteTarget {
    /// `user@address`, as used by ssh.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }

    /// `user@address:path`, as used by scp.
    #[must_use]
    pub fn remote_path(&self, path: &str) -> String {
        format!("{}:{path}", self.destination())
    }
}
