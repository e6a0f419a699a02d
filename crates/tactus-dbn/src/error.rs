//! Error types for the decoder.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected before any decoding work. `field` names the
    /// offending option so callers can fix it.
    #[error("invalid configuration: {field} {message}")]
    Config {
        field: &'static str,
        message: String,
    },

    /// Activation input with the wrong shape for the requested variant.
    #[error("invalid input: {0}")]
    Input(String),

    /// Internal model invariant violated (transition rows not summing to 1,
    /// prior of the wrong length, ...).
    #[error("model error: {0}")]
    Model(String),
}

impl Error {
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Config {
            field,
            message: message.into(),
        }
    }
}
