//! Basic-auth credentials for the inference endpoint.
//!
//! The password is wrapped in [`SecretString`] so it cannot appear in
//! `Debug` output or logs; exposure is explicit at the point of use.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::Path;

use crate::config::ConfigError;

/// Username/password pair plus the endpoint base URL, as loaded from a
/// credential file.
pub struct BasicCredentials {
    base_url: String,
    username: String,
    password: SecretString,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicCredentials {
    /// Build credentials from parts. Trailing slashes on the base URL
    /// are stripped so endpoint paths can be joined uniformly.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Load from a credential file: three non-empty lines holding base
    /// URL, username, and password, surrounding whitespace trimmed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
        let mut next = |field: &'static str| {
            lines.next().map(str::to_string).ok_or(ConfigError::MissingCredentialLine {
                path: path.to_path_buf(),
                field,
            })
        };

        let base_url = next("base URL")?;
        let username = next("username")?;
        let password = next("password")?;
        Ok(Self::new(base_url, username, password))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Explicitly expose the password for the basic-auth header.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}
