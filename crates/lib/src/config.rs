//! Credentials for the two destination interfaces.
//!
//! The library never reads the process environment on its own: the binary
//! builds these structs at startup (after `dotenvy` has loaded `.env`) and
//! passes them into the client constructors. A missing variable is a
//! configuration error and fails fast, before any network call.

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

/// S3-like key pair used by the upload client.
#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl StorageCredentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Reads `IAS3_ACCESS_KEY` / `IAS3_SECRET_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_key: require_env("IAS3_ACCESS_KEY")?,
            secret_key: require_env("IAS3_SECRET_KEY")?,
        })
    }
}

/// Session cookies identifying a logged-in user, required by the metadata
/// write endpoint.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub signature: String,
    pub user: String,
}

impl SessionCredentials {
    pub fn new(signature: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            user: user.into(),
        }
    }

    /// Reads `LOGGED_IN_SIG` / `LOGGED_IN_USER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            signature: require_env("LOGGED_IN_SIG")?,
            user: require_env("LOGGED_IN_USER")?,
        })
    }

    /// The `Cookie` header value expected by the metadata endpoint.
    pub fn cookie_header(&self) -> String {
        format!(
            "logged-in-sig={}; logged-in-user={}",
            self.signature, self.user
        )
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_carries_both_tokens() {
        let credentials = SessionCredentials::new("abc", "someone@example.org");
        assert_eq!(
            credentials.cookie_header(),
            "logged-in-sig=abc; logged-in-user=someone@example.org"
        );
    }
}
