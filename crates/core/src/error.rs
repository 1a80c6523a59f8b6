use thiserror::Error;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Session expired or unauthorized")]
    Unauthorized,

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http { status: u16, message: Option<String> },

    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// Message from the backend, when the server supplied one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ConsoleError::Http { message, .. } | ConsoleError::Rejected { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Single user-facing string for a failed action.
    ///
    /// Backend-provided messages win; anything else collapses to the
    /// action-specific `fallback` (e.g. "Failed to load advertisers").
    /// A 401 always reads as an expired session.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_unauthorized() {
            return "Your session has expired. Please log in again.".to_string();
        }
        self.backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConsoleError::Unauthorized)
    }
}
