// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! immutable [`Config`] loaded once at startup. Nothing here is mutated after
//! the server starts serving traffic.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | Shared HMAC secret used to sign and verify access tokens | Required |
//! | `DATA_DIR` | Directory holding the embedded database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `BOOK_TOPIC` | Topic receiving book-creation events | `book-details` |
//! | `BOOK_ERROR_TOPIC` | Topic reserved for failed book events | `book-details-error` |
//! | `BOOK_CONSUMER_GROUP` | Consumer group of the book event listener | `book-management` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::path::PathBuf;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the embedded database directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BOOK_TOPIC_ENV: &str = "BOOK_TOPIC";
pub const BOOK_ERROR_TOPIC_ENV: &str = "BOOK_ERROR_TOPIC";
pub const BOOK_CONSUMER_GROUP_ENV: &str = "BOOK_CONSUMER_GROUP";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BOOK_TOPIC: &str = "book-details";
pub const DEFAULT_BOOK_ERROR_TOPIC: &str = "book-details-error";
pub const DEFAULT_BOOK_CONSUMER_GROUP: &str = "book-management";

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "books.redb";

/// Fatal configuration problems. The service must not start when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("token signing secret must not be blank")]
    BlankSecret,
}

/// Names of the topics used by the book event side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicsConfig {
    /// Topic receiving book-creation events (produced and consumed).
    pub input_output_topic: String,
    /// Topic provisioned for failed events.
    pub error_topic: String,
    /// Consumer group of the book event listener.
    pub consumer_group: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            input_output_topic: DEFAULT_BOOK_TOPIC.to_string(),
            error_topic: DEFAULT_BOOK_ERROR_TOPIC.to_string(),
            consumer_group: DEFAULT_BOOK_CONSUMER_GROUP.to_string(),
        }
    }
}

/// Service configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub topics: TopicsConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::BlankSecret);
        }

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let defaults = TopicsConfig::default();

        Ok(Self {
            jwt_secret,
            data_dir: PathBuf::from(
                lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            topics: TopicsConfig {
                input_output_topic: lookup(BOOK_TOPIC_ENV).unwrap_or(defaults.input_output_topic),
                error_topic: lookup(BOOK_ERROR_TOPIC_ENV).unwrap_or(defaults.error_topic),
                consumer_group: lookup(BOOK_CONSUMER_GROUP_ENV)
                    .unwrap_or(defaults.consumer_group),
            },
        })
    }

    /// Path of the embedded database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Socket address string to bind the HTTP listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("topics", &self.topics)
            .finish()
    }
}
