//! Error taxonomy for the storefront core.
//!
//! None of these escape the event handler or the variant resolver: they are
//! logged through `tracing` and folded into an outcome or a fallback to the
//! control variant.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required capability or configuration entry is absent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The event payload is missing, not an object, or lacks the nested payload key.
    #[error("malformed event '{event}': {reason}")]
    MalformedEvent { event: String, reason: String },

    /// A target identifier or selector matched no element on the page.
    #[error("no element matches '{0}'")]
    TargetNotFound(String),

    /// The flag source reported a failure while reading a flag value.
    #[error("flag lookup for '{key}' failed: {reason}")]
    FlagLookup { key: String, reason: String },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn malformed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedEvent {
            event: event.into(),
            reason: reason.into(),
        }
    }
}
