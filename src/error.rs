use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Missing API key. Set OPENROUTER_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification error: {0}")]
    Notify(String),

    /// for `History` stores that can fail to read or write
    #[error("History error: {0}")]
    History(String),

    #[error("Server error: {0}")]
    Server(String),
}
