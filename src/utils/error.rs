use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Item {id} not found")]
    ItemNotFound { id: i64 },

    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid push message: {message}")]
    MessageError { message: String },
}

impl FeedError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::ApiError(e) if e.is_connect() => {
                "Could not reach the items service. Is it running?".to_string()
            }
            FeedError::ApiError(e) if e.is_timeout() => {
                "The items service did not answer in time.".to_string()
            }
            FeedError::ConfigError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            FeedError::ItemNotFound { id } => format!("There is no item with id {}.", id),
            _ => self.to_string(),
        }
    }

    /// 程式結束碼：設定錯誤 2、找不到 3、其他 1
    pub fn exit_code(&self) -> i32 {
        match self {
            FeedError::ConfigError { .. }
            | FeedError::MissingConfigError { .. }
            | FeedError::InvalidConfigValueError { .. } => 2,
            FeedError::ItemNotFound { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
