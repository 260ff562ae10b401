//! # Client Configuration
//!
//! [`ClientConfig`] gathers everything needed to open a [`crate::Session`]: where the server is,
//! how to talk to it, which server versions are acceptable and how the session is kept alive.
//!
//! It deserializes from JSON with every field optional:
//!
//! ```json
//! { "host": "10.0.0.5", "protocol": "grpc", "min_version": "1.5.0" }
//! ```
use crate::{session::SessionConfig, transport::SessionType};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr, time::Duration};

/// A `major.minor.patch` server version. Ordering is lexicographic on the three parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid version '{0}', expected 'major.minor.patch'")]
pub struct InvalidVersion(String);

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(s.to_string());
        let mut parts = s.trim().trim_start_matches('v').split('.');

        let mut next = || -> Result<u32, InvalidVersion> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse()
                .map_err(|_| invalid())
        };
        let version = Version::new(next()?, next()?, next()?);

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl TryFrom<String> for Version {
    type Error = InvalidVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The wire protocol used to reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Rest,
    Grpc,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" | "http" => Ok(Protocol::Rest),
            "grpc" => Ok(Protocol::Grpc),
            other => Err(format!("Unknown protocol '{other}', expected 'rest' or 'grpc'")),
        }
    }
}

/// Oldest server version supported by default.
pub const MIN_APP_VERSION: Version = Version::new(1, 5, 0);
/// Newest server version supported by default.
pub const MAX_APP_VERSION: Version = Version::new(1, 6, 99);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': '{source}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': '{source}'")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Connection and session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub username: String,
    pub password: String,
    /// Oldest accepted server version (inclusive).
    pub min_version: Version,
    /// Newest accepted server version (inclusive).
    pub max_version: Version,
    pub session_type: SessionType,
    pub keepalive_interval_ms: u64,
    /// How many times the initial version check is attempted before giving up.
    pub connect_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50000,
            protocol: Protocol::default(),
            username: String::new(),
            password: String::new(),
            min_version: MIN_APP_VERSION,
            max_version: MAX_APP_VERSION,
            session_type: SessionType::default(),
            keepalive_interval_ms: 500,
            connect_attempts: 1,
            retry_delay_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Loads a JSON configuration file. Missing fields take their default value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The `http://host:port` address of the server.
    pub fn address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            min_version: self.min_version,
            max_version: self.max_version,
            session_type: self.session_type,
            keepalive_interval: Duration::from_millis(self.keepalive_interval_ms),
            connect_attempts: self.connect_attempts.max(1),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
