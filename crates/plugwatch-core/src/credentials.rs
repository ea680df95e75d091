//! Tuya API credentials and their storage in the OS keyring.

use crate::error::ConfigError;

pub const API_KEY_ENTRY: &str = "tuya_api_key";
pub const API_SECRET_ENTRY: &str = "tuya_api_secret";

/// Access id/secret pair for the Tuya cloud project.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Fill whichever of `api_key`/`api_secret` is missing from the keyring.
    ///
    /// # Errors
    /// [`ConfigError::MissingKey`] if a value is in neither place.
    pub fn resolve(api_key: Option<String>, api_secret: Option<String>) -> Result<Self, ConfigError> {
        let api_key = match api_key {
            Some(k) => k,
            None => keyring_store::get(API_KEY_ENTRY)?
                .ok_or_else(|| ConfigError::MissingKey("api key (--api-key or TUYA_API_KEY)".into()))?,
        };
        let api_secret = match api_secret {
            Some(s) => s,
            None => keyring_store::get(API_SECRET_ENTRY)?.ok_or_else(|| {
                ConfigError::MissingKey("api secret (--api-secret or TUYA_API_SECRET)".into())
            })?,
        };
        Ok(Self { api_key, api_secret })
    }

    pub fn store(&self) -> Result<(), ConfigError> {
        keyring_store::set(API_KEY_ENTRY, &self.api_key)?;
        keyring_store::set(API_SECRET_ENTRY, &self.api_secret)?;
        Ok(())
    }

    pub fn clear() -> Result<(), ConfigError> {
        keyring_store::delete(API_KEY_ENTRY)?;
        keyring_store::delete(API_SECRET_ENTRY)?;
        Ok(())
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::ConfigError;

    const SERVICE: &str = "plugwatch";

    pub fn get(key: &str) -> Result<Option<String>, ConfigError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), ConfigError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), ConfigError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
