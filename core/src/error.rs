use std::path::PathBuf;

use thiserror::Error;

/// Dockermake error types
#[derive(Error, Debug)]
pub enum DockermakeError {
    /// A logical line starts with a keyword outside the instruction set
    #[error("Unknown instruction '{keyword}' at line {line}")]
    UnknownInstruction { keyword: String, line: usize },

    /// The Dockerfile text could not be split into logical lines
    #[error("Dockerfile parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Linting produced errors and the caller asked to stop on them
    #[error("Linting failed with {} error(s)", errors.len())]
    LintingFailed {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    /// Dockerfile path does not exist
    #[error("Dockerfile not found: {}", .0.display())]
    DockerfileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for DockermakeError {
    fn from(err: serde_json::Error) -> Self {
        DockermakeError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for DockermakeError {
    fn from(err: serde_yaml::Error) -> Self {
        DockermakeError::SerializationError(err.to_string())
    }
}

/// Result type alias for dockermake operations
pub type Result<T> = std::result::Result<T, DockermakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_instruction_display() {
        let error = DockermakeError::UnknownInstruction {
            keyword: "UNKNOWN".to_string(),
            line: 3,
        };
        assert_eq!(error.to_string(), "Unknown instruction 'UNKNOWN' at line 3");
    }

    #[test]
    fn test_parse_error_display() {
        let error = DockermakeError::ParseError {
            line: 12,
            message: "input ends inside a line continuation".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Dockerfile parse error at line 12: input ends inside a line continuation"
        );
    }

    #[test]
    fn test_linting_failed_display() {
        let error = DockermakeError::LintingFailed {
            errors: vec!["ADD is prohibited (rule6)".to_string(); 2],
            warnings: vec![],
        };
        assert_eq!(error.to_string(), "Linting failed with 2 error(s)");
    }

    #[test]
    fn test_dockerfile_not_found_display() {
        let error = DockermakeError::DockerfileNotFound(PathBuf::from("/tmp/missing/Dockerfile"));
        assert_eq!(
            error.to_string(),
            "Dockerfile not found: /tmp/missing/Dockerfile"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: DockermakeError = io_error.into();
        assert!(matches!(error, DockermakeError::IoError(_)));
        assert!(error.to_string().contains("denied"));
    }

    #[test]
    fn test_serde_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<Vec<String>>("{ not: [a list").unwrap_err();
        let error: DockermakeError = yaml_error.into();
        assert!(matches!(error, DockermakeError::SerializationError(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<Vec<String>>("[1,").unwrap_err();
        let error: DockermakeError = json_error.into();
        assert!(error.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_config_error_display() {
        let error = DockermakeError::ConfigError("registries must be a mapping".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: registries must be a mapping"
        );
    }
}
