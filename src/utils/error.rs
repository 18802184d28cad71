use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryPluginError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("Function not found in memory plugin: {name}")]
    FunctionNotFound { name: String },

    #[error("Memory store request failed ({status}): {message}")]
    MemoryStoreError { status: u16, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl MemoryPluginError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Errors the caller can fix by changing its input or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::FunctionNotFound { .. }
                | Self::ConfigError { .. }
                | Self::InvalidConfigValueError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidArgument { message } => format!("Invalid argument: {}", message),
            Self::FunctionNotFound { name } => {
                format!("Unknown function '{}', expected 'recall' or 'save'", name)
            }
            Self::MemoryStoreError { status, .. } => {
                format!("The memory store rejected the request (HTTP {})", status)
            }
            Self::ApiError(_) => "Could not reach the memory store".to_string(),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(_) => "Unexpected data from the memory store".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MemoryPluginError>;
