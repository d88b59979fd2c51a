//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::property::PropertyType;

/// Errors that can occur while loading, editing or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Key absent from the property table
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value of the wrong type for its key
    #[error("key '{key}' expects {expected}, found {found}")]
    WrongType {
        /// Offending key.
        key: String,
        /// Declared type of the key.
        expected: PropertyType,
        /// Kind of value supplied.
        found: &'static str,
    },

    /// Value of the right type outside its valid range
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Offending key.
        key: String,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Malformed slur-classifier threshold table
    #[error("malformed threshold table at rule {row}: '{token}' {reason}")]
    ThresholdTable {
        /// Zero-based rule (row) index.
        row: usize,
        /// Token that failed.
        token: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // --- factory methods ---

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
    }

    #[test]
    fn create_dir_factory_produces_correct_variant() {
        let err = ConfigError::create_dir("/dir/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::CreateDir { ref path, .. } if path == std::path::Path::new("/dir/path"))
        );
    }

    // --- Display formatting ---

    #[test]
    fn write_file_display() {
        let err = ConfigError::write_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to write file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
    }

    #[test]
    fn wrong_type_display() {
        let err = ConfigError::WrongType {
            key: "minPoints".to_string(),
            expected: PropertyType::Int,
            found: "string",
        };
        assert_eq!(err.to_string(), "key 'minPoints' expects int, found string");
    }

    #[test]
    fn threshold_table_display() {
        let err = ConfigError::ThresholdTable {
            row: 1,
            token: "x".to_string(),
            reason: "is not a number",
        };
        assert_eq!(
            err.to_string(),
            "malformed threshold table at rule 1: 'x' is not a number"
        );
    }

    // --- Error::source() chain ---

    #[test]
    fn read_file_source_is_some() {
        let err = ConfigError::read_file("/x", mock_io_err());
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    #[test]
    fn invalid_value_source_is_none() {
        let err = ConfigError::invalid("minPoints", "must be non-negative");
        assert!(err.source().is_none());
    }
}
