//! Common error types for the yearbook crates

use thiserror::Error;

/// Common result type for yearbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the roster service and the batch job
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML bootstrap file could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more required environment settings are absent
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_lists_every_name() {
        let err = Error::MissingSettings(vec![
            "YEARBOOK_CLOUD_NAME".to_string(),
            "YEARBOOK_CLOUD_API_KEY".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing environment variables: YEARBOOK_CLOUD_NAME, YEARBOOK_CLOUD_API_KEY"
        );
    }
}
