use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migrate(#[from] MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: &'static str, value: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Field-level rejection raised while turning raw input into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },
}

pub type AppResult<T> = Result<T, AppError>;
