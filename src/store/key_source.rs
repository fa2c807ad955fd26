//! Where a store's encryption passphrase comes from.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::crypto::identity::{IdentityProvider, SystemIdentity};
use crate::crypto::kdf::{derive_key, Argon2Params, MasterKey};
use crate::errors::{Result, StoreError};

/// Encryption mode of a store.
#[derive(Clone, Default)]
pub enum Encryption {
    /// Plain text on disk.
    #[default]
    None,
    /// Key derived from a caller-supplied passphrase.
    Passphrase(String),
    /// Key derived from the user/host identity reported by the provider.
    Machine(Arc<dyn IdentityProvider>),
}

impl Encryption {
    /// Machine-bound encryption using the running system's identity.
    pub fn machine() -> Self {
        Encryption::Machine(Arc::new(SystemIdentity))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Encryption::None)
    }

    /// The effective passphrase, or `None` for plain stores.
    pub fn passphrase(&self) -> Result<Option<Zeroizing<String>>> {
        let passphrase = match self {
            Encryption::None => return Ok(None),
            Encryption::Passphrase(p) => Zeroizing::new(p.clone()),
            Encryption::Machine(identity) => Zeroizing::new(identity.passphrase()),
        };
        if passphrase.is_empty() {
            return Err(StoreError::KeyDerivationFailed(
                "passphrase cannot be empty".into(),
            ));
        }
        Ok(Some(passphrase))
    }

    /// Resolve the passphrase and derive the cipher key from it.
    pub(crate) fn resolve(
        &self,
        params: &Argon2Params,
    ) -> Result<Option<(Zeroizing<String>, MasterKey)>> {
        match self.passphrase()? {
            Some(passphrase) => {
                let key = derive_key(passphrase.as_bytes(), params)?;
                Ok(Some((passphrase, key)))
            }
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encryption::None => f.write_str("None"),
            Encryption::Passphrase(_) => f.write_str("Passphrase(..)"),
            Encryption::Machine(_) => f.write_str("Machine(..)"),
        }
    }
}
