//! Connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Connection`](crate::executor::Connection)
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use aqueduct_core::ConnectionConfig;
///
/// let config: ConnectionConfig =
///     serde_json::from_str(r#"{"database": "got", "prefix": "got_"}"#).unwrap();
/// assert_eq!(config.name, "arangodb");
/// assert_eq!(config.database, "got");
/// assert!(config.reconnect);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connection name, reported in query errors and events
    pub name: String,
    /// Server endpoint handed to the client
    pub endpoint: String,
    pub database: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Prefix prepended to every collection name
    pub prefix: String,
    /// Keep executed queries in memory
    pub log_queries: bool,
    /// Reconnect and retry once when the connection drops during a query
    pub reconnect: bool,
    /// Per-query timeout in milliseconds
    pub query_timeout_ms: Option<u64>,
    /// How many times a transaction is attempted on concurrency errors
    pub transaction_attempts: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            name: "arangodb".to_string(),
            endpoint: "http://localhost:8529".to_string(),
            database: "_system".to_string(),
            username: "root".to_string(),
            password: None,
            prefix: String::new(),
            log_queries: false,
            reconnect: true,
            query_timeout_ms: None,
            transaction_attempts: 1,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the credentials used by the client
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = Some(password.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable the in-memory query log
    pub fn with_query_log(mut self) -> Self {
        self.log_queries = true;
        self
    }

    /// Fail immediately instead of reconnecting on a dropped connection
    pub fn no_reconnect(mut self) -> Self {
        self.reconnect = false;
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout_ms = Some(duration.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn transaction_attempts(mut self, attempts: u32) -> Self {
        self.transaction_attempts = attempts.max(1);
        self
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}
