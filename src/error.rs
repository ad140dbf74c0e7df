use thiserror::Error;

/// Errors raised by the cache layer.
///
/// By policy none of these are fatal to a page render: reads that fail degrade
/// to a miss, writes that fail degrade to a logged no-op. Only `InvalidKey`
/// short-circuits an invocation, and even then the tag returns empty markup
/// rather than propagating.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("cache backend error: {message}")]
    Backend { message: String },
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("cache item codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CacheError {
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Failure of the template-engine collaborator.
///
/// Unlike cache errors, render errors propagate to the caller: a fragment that
/// cannot be executed has no markup to fall back on.
#[derive(Debug, Error)]
#[error("template render failed: {message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
