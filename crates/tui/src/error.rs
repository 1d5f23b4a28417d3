use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid timezone: {0}")]
    Timezone(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
