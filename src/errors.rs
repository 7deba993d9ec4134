/*!
 * Error types for the backtrans application.
 *
 * This module contains custom error types for the engine adapters, the
 * translation pipeline and the application shell, using the thiserror crate
 * for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation engine
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The account's character quota is used up (DeepL status 456)
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The engine cannot handle the requested language
    #[error("Unsupported language for {engine}: {language}")]
    UnsupportedLanguage {
        /// Engine display name
        engine: String,
        /// Language that was requested
        language: String,
    },
}

impl ProviderError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The request was rejected before any engine was called
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No engine produced a usable translation
    #[error("All engines failed: {0}")]
    AllEnginesFailed(String),

    /// A chunk of a long text could not be translated
    #[error("Chunk {index} failed: {message}")]
    Chunk {
        /// Zero-based chunk index
        index: usize,
        /// Failure description
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
