use thiserror::Error;

/// 錯誤分類，決定 HTTP 狀態碼與日誌層級
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 使用者輸入錯誤 (400)
    Client,
    /// 推論流程中的內部錯誤 (500)
    Processing,
    /// 啟動階段錯誤 (配置、模型載入)
    Startup,
}

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidInputError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed request: {message}")]
    MalformedRequestError { message: String },

    #[error("Preprocessing error: {message}")]
    PreprocessingError { message: String },

    #[error("Predicted price {price:.2} is outside the sane range [{min}, {max}]")]
    PredictionOutOfRangeError { price: f64, min: f64, max: f64 },

    #[error("Model error: {message}")]
    ModelError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PredictorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingFieldError { .. }
            | Self::InvalidInputError { .. }
            | Self::MalformedRequestError { .. } => ErrorCategory::Client,
            Self::PreprocessingError { .. } | Self::PredictionOutOfRangeError { .. } => {
                ErrorCategory::Processing
            }
            Self::ModelError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::CsvError(_) => ErrorCategory::Startup,
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Client => 400,
            ErrorCategory::Processing | ErrorCategory::Startup => 500,
        }
    }

    /// 回傳給客戶端的訊息；內部錯誤不外洩細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Client => self.to_string(),
            _ => "Error processing prediction request".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingFieldError { .. } | Self::InvalidInputError { .. } => {
                "Check the request body against the documented input fields and bounds"
            }
            Self::MalformedRequestError { .. } => "Send a JSON object as the request body",
            Self::PreprocessingError { .. } => {
                "The model bundle does not match the service's feature layout; retrain it"
            }
            Self::PredictionOutOfRangeError { .. } => {
                "The model produced an implausible price; retrain or inspect the bundle"
            }
            Self::ModelError { .. } | Self::SerializationError(_) => {
                "Delete the model bundle so a fresh one is trained on next start"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            Self::IoError(_) | Self::CsvError(_) => {
                "Check that the path exists and the process can read and write it"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
