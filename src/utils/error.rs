use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("File size ({size} bytes) exceeds maximum allowed size ({limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalyticsError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedInput { .. }
            | Self::FileTooLarge { .. }
            | Self::UnsupportedFileType { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MalformedInput { .. } => {
                format!("The uploaded file could not be read as a table ({})", self)
            }
            Self::FileTooLarge { .. } | Self::UnsupportedFileType { .. } => self.to_string(),
            Self::IoError(e) => format!("Could not access a file: {}", e),
            Self::SerializationError(_) => "Failed to build the report output".to_string(),
            _ => format!("Invalid configuration: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => {
                "Check that the file is delimited text with a header row and the declared encoding"
            }
            Self::FileTooLarge { .. } => "Split the dataset or raise input.max_file_size",
            Self::UnsupportedFileType { .. } => {
                "Upload a .csv file or extend input.allowed_extensions"
            }
            Self::IoError(_) => "Verify the path exists and is readable/writable",
            Self::SerializationError(_) => "Report this as a bug",
            _ => "Review the configuration file and command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
