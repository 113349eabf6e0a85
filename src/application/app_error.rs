use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("API key is required")]
    MissingApiKey,

    #[error("Invalid or revoked API key")]
    InvalidApiKey,

    #[error("Missing required fields: to, subject, and text/html")]
    MissingFields,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The transport refused or failed the message. The attempt is already logged.
    #[error("Failed to send email: {0}")]
    DispatchFailed(String),
}

pub type AppResult<T> = Result<T, AppError>;
