use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to read '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required column '{column}' in {input}")]
    MissingColumnError { column: String, input: String },

    #[error("Duplicate column '{column}' in {input}")]
    DuplicateColumnError { column: String, input: String },

    #[error("Malformed row at line {line} in {input}: {reason}")]
    MalformedRowError {
        input: String,
        line: u64,
        reason: String,
    },

    #[error("Encoding detection inconclusive for {input}: {reason}")]
    EncodingDetectionError { input: String, reason: String },

    #[error("Unknown encoding label '{label}'")]
    UnknownEncodingError { label: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Schema,
    Encoding,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 可恢復，只需警告
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::ApiError(_) => ErrorCategory::Network,
            LeadError::IoError(_)
            | LeadError::FileReadError { .. }
            | LeadError::FileWriteError { .. } => ErrorCategory::Io,
            LeadError::CsvError(_)
            | LeadError::MissingColumnError { .. }
            | LeadError::DuplicateColumnError { .. }
            | LeadError::MalformedRowError { .. } => ErrorCategory::Schema,
            LeadError::EncodingDetectionError { .. } | LeadError::UnknownEncodingError { .. } => {
                ErrorCategory::Encoding
            }
            LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LeadError::SerializationError(_) | LeadError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeadError::EncodingDetectionError { .. } => ErrorSeverity::Low,
            LeadError::ApiError(_) => ErrorSeverity::Medium,
            LeadError::IoError(_)
            | LeadError::FileReadError { .. }
            | LeadError::FileWriteError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Exit code for a run that stopped on this error; never 0.
    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code().max(1)
    }

    /// Only encoding detection is recoverable; everything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        self.severity() > ErrorSeverity::Low
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::ApiError(_) => {
                "Check network connectivity and the executive API endpoint".to_string()
            }
            LeadError::FileReadError { path, .. } => {
                format!("Make sure '{}' exists and is readable", path)
            }
            LeadError::FileWriteError { path, .. } => {
                format!("Make sure the directory of '{}' is writable", path)
            }
            LeadError::IoError(_) => "Check file paths and permissions".to_string(),
            LeadError::CsvError(_) | LeadError::MalformedRowError { .. } => {
                "Check that the file is a well-formed CSV with a header row".to_string()
            }
            LeadError::MissingColumnError { column, input } => format!(
                "Add a '{}' column to {} or pass the matching --*-column option",
                column, input
            ),
            LeadError::DuplicateColumnError { column, input } => {
                format!("Rename one of the '{}' columns in {}", column, input)
            }
            LeadError::EncodingDetectionError { .. } => {
                "Pass an explicit encoding, e.g. --secondary-encoding windows-1252".to_string()
            }
            LeadError::UnknownEncodingError { .. } => {
                "Use a WHATWG encoding label such as utf-8, windows-1252 or shift_jis".to_string()
            }
            LeadError::ConfigValidationError { field, .. }
            | LeadError::InvalidConfigValueError { field, .. }
            | LeadError::MissingConfigError { field } => {
                format!("Fix the '{}' setting on the command line or in the config file", field)
            }
            LeadError::SerializationError(_) | LeadError::ProcessingError { .. } => {
                "Re-run with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::ApiError(e) => format!("Could not reach the executive API: {}", e),
            LeadError::MissingColumnError { column, input } => {
                format!("{} has no '{}' column", input, column)
            }
            LeadError::FileReadError { path, .. } => format!("Cannot read input file '{}'", path),
            LeadError::FileWriteError { path, .. } => {
                format!("Cannot write output file '{}'", path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
