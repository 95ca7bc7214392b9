//! Error types for Aqueduct

use crate::bindings::Bindings;
use std::time::Duration;
use thiserror::Error;

/// ArangoDB error numbers that mark a transaction as safe to retry
const CONCURRENCY_ERROR_NUMS: [i64; 3] = [
    29,   // deadlock
    1200, // write-write conflict
    18,   // lock timeout
];

const CONCURRENCY_MESSAGES: [&str; 5] = [
    "deadlock detected",
    "write-write conflict",
    "conflict",
    "lock timeout",
    "timeout waiting to lock",
];

const LOST_CONNECTION_MESSAGES: [&str; 8] = [
    "server has gone away",
    "no connection to the server",
    "lost connection",
    "connection refused",
    "connection reset",
    "broken pipe",
    "error while sending",
    "could not connect to server",
];

/// Error reported by a [`DatabaseClient`](crate::executor::DatabaseClient)
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{code}/{error_num}] {message}")]
pub struct ClientError {
    /// HTTP status code returned by the server (0 when no response arrived)
    pub code: u16,
    /// ArangoDB error number
    pub error_num: i64,
    pub message: String,
}

impl ClientError {
    pub fn new(code: u16, error_num: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            error_num,
            message: message.into(),
        }
    }

    /// A failure where no response came back from the server
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(0, 0, message)
    }

    /// Whether the connection to the server dropped underneath the request
    pub fn is_lost_connection(&self) -> bool {
        let message = self.message.to_lowercase();
        LOST_CONNECTION_MESSAGES
            .iter()
            .any(|needle| message.contains(needle))
    }

    /// Whether the failure is a deadlock, write conflict or lock timeout
    pub fn is_concurrency_error(&self) -> bool {
        if CONCURRENCY_ERROR_NUMS.contains(&self.error_num) {
            return true;
        }

        let message = self.message.to_lowercase();
        CONCURRENCY_MESSAGES
            .iter()
            .any(|needle| message.contains(needle))
    }
}

/// The main error type for Aqueduct operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A builder method received arguments it cannot express
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The operation has no AQL equivalent
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// The builder is in a state that cannot be compiled
    #[error("AQL compilation error: {message}")]
    Compilation { message: String },

    /// Execution failed on the server
    #[error("Query failed on connection '{connection}': {source} (AQL: {query})")]
    Query {
        connection: String,
        query: String,
        bindings: Bindings,
        #[source]
        source: ClientError,
    },

    /// Transaction misuse, such as committing without a transaction
    #[error("Transaction error: {message}")]
    Transaction { message: String },

    /// Client error raised outside of a query
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// The query did not finish within the configured timeout
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Convenience Result type for Aqueduct operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new compilation error
    pub fn compilation(message: impl Into<String>) -> Self {
        Self::Compilation {
            message: message.into(),
        }
    }

    /// Create a new transaction error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }

    /// Wrap a client failure together with the query that caused it
    pub fn query(
        connection: impl Into<String>,
        query: impl Into<String>,
        bindings: Bindings,
        source: ClientError,
    ) -> Self {
        Self::Query {
            connection: connection.into(),
            query: query.into(),
            bindings,
            source,
        }
    }

    /// The underlying client error, if any
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Query { source, .. } => Some(source),
            Self::Client(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_lost_connection(&self) -> bool {
        self.client_error()
            .is_some_and(ClientError::is_lost_connection)
    }

    pub fn is_concurrency_error(&self) -> bool {
        self.client_error()
            .is_some_and(ClientError::is_concurrency_error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::invalid_argument("Illegal operator and value combination.");
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid argument: Illegal operator and value combination."
        );
    }

    #[test]
    fn test_unsupported_error() {
        let err = Error::unsupported("right join");
        assert!(matches!(err, Error::Unsupported { .. }));
        assert_eq!(err.to_string(), "Unsupported operation: right join");
    }

    #[test]
    fn test_query_error_carries_context() {
        let err = Error::query(
            "arangodb",
            "FOR doc IN characters RETURN doc",
            Bindings::new(),
            ClientError::new(404, 1203, "collection or view not found: characters"),
        );

        assert!(err.to_string().contains("arangodb"));
        assert!(err.to_string().contains("FOR doc IN characters RETURN doc"));
        assert_eq!(err.client_error().map(|e| e.error_num), Some(1203));
    }

    #[test]
    fn test_lost_connection_detection() {
        assert!(ClientError::connection("Connection refused (os error 111)").is_lost_connection());
        assert!(ClientError::connection("MySQL server has gone away").is_lost_connection());
        assert!(!ClientError::new(400, 1501, "syntax error").is_lost_connection());
    }

    #[test]
    fn test_concurrency_error_detection() {
        assert!(ClientError::new(409, 1200, "write-write conflict").is_concurrency_error());
        assert!(ClientError::new(500, 29, "").is_concurrency_error());
        assert!(ClientError::new(500, 18, "").is_concurrency_error());
        assert!(ClientError::new(500, 4, "Deadlock detected").is_concurrency_error());
        assert!(!ClientError::new(400, 1501, "syntax error").is_concurrency_error());
    }

    #[test]
    fn test_error_predicates_delegate_to_client_error() {
        let err = Error::Client(ClientError::new(409, 1200, "conflict"));
        assert!(err.is_concurrency_error());
        assert!(!err.is_lost_connection());
        assert!(!Error::transaction("nope").is_concurrency_error());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
