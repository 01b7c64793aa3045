/// Errors from the history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("User id is required")]
    MissingUser,

    #[error("Invalid service-account credentials: {0}")]
    Credentials(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Access token request failed ({0})")]
    TokenExchange(u16),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Firestore answered with a non-2xx status.
    #[error("Firestore {operation} failed ({status})")]
    Store {
        operation: &'static str,
        status: u16,
    },
}
