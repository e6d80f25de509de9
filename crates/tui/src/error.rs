use admin_core::GatewayError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("logging error: {0}")]
    Logging(String),
}
