//! Error types for the MySQL connection provider.

use thiserror::Error;

/// Errors that can occur while setting up a MySQL provider.
#[derive(Error, Debug)]
pub enum MySqlProviderError {
    /// The connection string is not a valid `mysql://` URL.
    #[error("invalid MySQL connection string: {0}")]
    Url(#[from] mysql_async::UrlError),

    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
