//! # CLI
//!
//! This module defines the command-line interface of `caffa` using `clap`.
//!
//! Connection settings can come from a JSON config file (`--config`), from the environment or
//! from flags. Flags win over the environment, which wins over the file.
use anyhow::Context;
use caffa_core::{ClientConfig, Protocol, SessionType};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caffa", version, about = "Command-line client for Caffa application servers")]
pub struct Cli {
    /// Path to a JSON client configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server host name or address
    #[arg(long, env = "CAFFA_HOST", global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "CAFFA_PORT", global = true)]
    pub port: Option<u16>,

    /// Wire protocol: 'rest' or 'grpc'
    #[arg(long, value_parser = parse_protocol, global = true)]
    pub protocol: Option<Protocol>,

    #[arg(short = 'u', long, env = "CAFFA_USER", global = true)]
    pub username: Option<String>,

    #[arg(short = 'p', long, env = "CAFFA_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Open an observing session instead of a regular one
    #[arg(long, global = true)]
    pub observing: bool,

    /// Log requests and session activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the server application and the session opened on it
    Info,

    /// List the keywords of every schema known to the server
    Schemas,

    /// Describe the fields and methods of a class
    Schema {
        /// Class keyword (e.g. DemoDocument)
        keyword: String,
    },

    /// Print a document with all its readable fields
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// caffa --protocol grpc document
    /// ```
    Document {
        /// Document id. The server's default document when omitted
        #[arg(default_value = "")]
        id: String,
    },

    /// Read a field
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// caffa get demoObject.doubleVector
    /// caffa get 'children[1].name'
    /// ```
    Get {
        /// Dotted field path from the document root
        path: String,
        /// Document id
        #[arg(short, long, default_value = "")]
        document: String,
    },

    /// Write a field from a JSON value
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// caffa set demoObject.intField 42
    /// caffa set demoObject.stringVector '["a", "b"]'
    /// ```
    Set {
        /// Dotted field path from the document root
        path: String,
        #[arg(value_parser = parse_json)]
        value: serde_json::Value,
        /// Document id
        #[arg(short, long, default_value = "")]
        document: String,
    },

    /// List the methods of an object
    Methods {
        /// Dotted path of the object. The document root when omitted
        #[arg(default_value = "")]
        path: String,
        /// Ask the server instead of reading the class schema
        #[arg(long)]
        remote: bool,
        /// Document id
        #[arg(short, long, default_value = "")]
        document: String,
    },

    /// Execute a method on an object
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// caffa call demoObject copyValues --args '{"intValue": 41, "doubleValue": 3.0}'
    /// caffa call demoObject copyValues --args '[41, 3.0]'
    /// ```
    Call {
        /// Dotted path of the object, '.' for the document root
        path: String,
        /// Method name
        method: String,
        /// Arguments: a JSON object for labelled, a JSON array for positional arguments
        #[arg(long, value_parser = parse_json)]
        args: Option<serde_json::Value>,
        /// Document id
        #[arg(short, long, default_value = "")]
        document: String,
    },
}

impl Cli {
    /// Resolves the client configuration: file first, then environment and flags on top.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path).context("Invalid configuration")?,
            None => ClientConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if self.observing {
            config.session_type = SessionType::Observing;
        }

        Ok(config)
    }
}

fn parse_protocol(value: &str) -> Result<Protocol, String> {
    value.parse()
}

fn parse_json(value: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(value).map_err(|e| format!("Invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "caffa",
            "--host",
            "10.0.0.5",
            "--protocol",
            "grpc",
            "--observing",
            "schemas",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.protocol, Protocol::Grpc);
        assert_eq!(config.session_type, SessionType::Observing);
        assert!(matches!(cli.command, Commands::Schemas));
    }

    #[test]
    fn test_set_requires_json() {
        assert!(Cli::try_parse_from(["caffa", "set", "a.b", "{oops"]).is_err());

        let cli = Cli::try_parse_from(["caffa", "set", "a.b", "[1, 2]"]).unwrap();
        let Commands::Set { value, document, .. } = cli.command else {
            panic!("expected the set command");
        };
        assert_eq!(value, serde_json::json!([1, 2]));
        assert_eq!(document, "");
    }
}
