/// Keysql Error Module
///
/// This module defines the error types for the keysql library.
/// It provides structured error handling with proper error propagation
/// and user-friendly error messages.
use thiserror::Error;

/// Comprehensive error type for keysql operations.
///
/// This enum covers all error scenarios that can occur within the library:
/// - Driver-level failures (connectivity, authentication, bad SQL)
/// - Keyed lookups that match no rows
/// - Precondition violations (database creation outside root context,
///   field/value arity mismatches, invalid identifiers)
/// - Configuration loading and background task failures
#[derive(Error, Debug)]
pub enum KeysqlError {
    /// Driver-level errors from the underlying MySQL connection
    #[error("Database error: {0}")]
    Driver(#[from] sqlx::Error),

    /// No live connection is held; `connect` has not succeeded yet
    #[error("Connection not found: call connect before issuing statements")]
    ConnectionNotFound,

    /// A keyed lookup returned zero rows
    #[error("No data found: {0}")]
    NoDataFound(String),

    /// Database creation attempted while a specific database is selected
    #[error("Database creation error: {0}")]
    DatabaseCreation(String),

    /// Field/value arity mismatch on insert
    #[error("Argument length mismatch: {fields} fields but {values} values")]
    DifferentArgLength { fields: usize, values: usize },

    /// A table or column identifier failed allow-list validation
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// Query construction and result extraction errors
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failures (panicked or cancelled submissions)
    #[error("Task error: {0}")]
    Task(String),
}

/// Type alias for Result to use KeysqlError as the error type.
///
/// This provides a consistent error type across the entire library
/// instead of using `Result<T, String>` or mixed error types.
pub type Result<T> = std::result::Result<T, KeysqlError>;
