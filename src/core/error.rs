//! Error taxonomy for the conversion contract.

use thiserror::Error;

/// Failure modes of a conversion attempt. All are recoverable: the
/// session stays usable and the message is displayable as-is.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input rejected locally; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// The provider answered but refused the conversion.
    #[error("{0}")]
    Rejected(String),

    /// Transport or decoding failure talking to the provider.
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        ConvertError::Network(err.to_string())
    }
}
