use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Storage error")]
    Storage(#[from] std::io::Error),

    #[error("Codec error")]
    Codec(#[from] serde_json::Error),

    #[error("Notification error {0}")]
    Notification(String),

    #[error("Internal Error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
