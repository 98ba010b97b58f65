#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid session token: {0}")]
    AuthDecode(String),

    #[error("Server rejected the request ({status}): {message}")]
    ServerRejection { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text for the blocking alert shown at the screen boundary.
    /// Transport and internal detail goes to the log, not the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::AuthDecode(e) => {
                tracing::warn!("Token decode failed: {e}");
                "Your session is invalid, please log in again".to_string()
            }
            AppError::ServerRejection { status, message } => {
                if message.trim().is_empty() {
                    format!("The server rejected the request (HTTP {status})")
                } else {
                    message.clone()
                }
            }
            AppError::Network(e) => {
                tracing::error!("Network error: {e}");
                "Could not reach the server, try again".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                "Something went wrong".to_string()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
