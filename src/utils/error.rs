use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema introspection failed: {0}")]
    SchemaIntrospection(#[source] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// 错误类别，供调用方区分失败原因
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "connection",
            AppError::SchemaIntrospection(_) => "schema_introspection",
            AppError::Config(_) => "config",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
