use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoalesceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid record at line {line}: {message}")]
    InvalidRecordError { line: usize, message: String },

    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRuleError { rule: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
}

impl CoalesceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoalesceError::IoError(_) => ErrorCategory::Io,
            CoalesceError::SerializationError(_)
            | CoalesceError::CsvError(_)
            | CoalesceError::InvalidRecordError { .. } => ErrorCategory::Data,
            CoalesceError::ConfigError { .. }
            | CoalesceError::ConfigValidationError { .. }
            | CoalesceError::InvalidConfigValueError { .. }
            | CoalesceError::MissingConfigError { .. }
            | CoalesceError::InvalidRuleError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CoalesceError::IoError(e) => format!("Could not read or write a file: {}", e),
            CoalesceError::SerializationError(e) => format!("Input is not valid JSON: {}", e),
            CoalesceError::CsvError(e) => format!("Input is not valid CSV: {}", e),
            CoalesceError::InvalidRecordError { line, message } => {
                format!("Record {} could not be used: {}", line, message)
            }
            CoalesceError::InvalidRuleError { rule, reason } => {
                format!("Rule '{}' is malformed: {}", rule, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the input path exists and the output directory is writable",
            ErrorCategory::Data => {
                "Check the input format; use --format to override extension-based detection"
            }
            ErrorCategory::Configuration => {
                "Check the rules: each needs a target and at least one source, e.g. name=nick,full_name"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Data => 3,
            ErrorCategory::Io => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoalesceError>;
