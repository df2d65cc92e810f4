//! Error types for remote fetching

use std::fmt;

/// A response was received but its status code indicates failure.
#[derive(Debug)]
pub struct ResponseError {
    pub code: u16,
    pub message: String,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response {}: {}", self.code, self.message)
    }
}

/// Errors reported by a fetch. Exactly one is delivered per fetch; there is
/// no retry.
#[derive(Debug)]
pub enum FetchError {
    /// The server answered with a non-success status.
    ResponseError(ResponseError),
    /// The body could not be decoded into the requested type.
    ParsingFailed(Box<dyn std::error::Error + Send + Sync>),
    /// Transport failure, missing body, or any other problem that prevented
    /// obtaining a decodable response.
    Other(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::ResponseError(err) => write!(f, "fetch failed: {}", err),
            FetchError::ParsingFailed(err) => write!(f, "failed to parse fetched data: {}", err),
            FetchError::Other(msg) => write!(f, "fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::ParsingFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
