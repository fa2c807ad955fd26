//! Machine/user identity used to auto-derive an encryption passphrase.
//!
//! A store opened with `Encryption::Machine` needs no stored secret: the
//! passphrase is rebuilt from the current user, host and domain.  The
//! same bytes therefore only decrypt on the same machine for the same
//! user, unless the passphrase is exported and reused explicitly.

use std::env;

/// Source of the stable strings a machine passphrase is built from.
pub trait IdentityProvider: Send + Sync {
    fn user(&self) -> String;
    fn host(&self) -> String;
    fn domain(&self) -> String;

    /// The passphrase string fed to the KDF: `user@host.domain`.
    fn passphrase(&self) -> String {
        let domain = self.domain();
        if domain.is_empty() {
            format!("{}@{}", self.user(), self.host())
        } else {
            format!("{}@{}.{}", self.user(), self.host(), domain)
        }
    }
}

/// Reads identity from the running process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn user(&self) -> String {
        first_env(&["USER", "USERNAME", "LOGNAME"]).unwrap_or_default()
    }

    fn host(&self) -> String {
        first_env(&["HOSTNAME", "COMPUTERNAME"])
            .or_else(os_hostname)
            .unwrap_or_default()
    }

    fn domain(&self) -> String {
        first_env(&["USERDOMAIN"]).unwrap_or_default()
    }
}

/// Fixed identity, for tests and for pinning a store to known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    pub user: String,
    pub host: String,
    pub domain: String,
}

impl StaticIdentity {
    pub fn new(user: &str, host: &str, domain: &str) -> Self {
        Self {
            user: user.to_string(),
            host: host.to_string(),
            domain: domain.to_string(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn user(&self) -> String {
        self.user.clone()
    }

    fn host(&self) -> String {
        self.host.clone()
    }

    fn domain(&self) -> String {
        self.domain.clone()
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn os_hostname() -> Option<String> {
    let name = gethostname::gethostname().to_string_lossy().trim().to_string();
    (!name.is_empty()).then_some(name)
}
