//! Shared error types for Wright core primitives.

/// The result type used throughout wright-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling core primitives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An identifier could not be parsed.
    #[error("invalid identifier: {message}")]
    InvalidId {
        /// Description of the parse failure.
        message: String,
    },

    /// An address could not be parsed.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the parse failure.
        message: String,
    },

    /// A network identifier could not be parsed.
    #[error("invalid network id '{value}': expected '*' or a decimal number")]
    InvalidNetworkId {
        /// The rejected input.
        value: String,
    },
}
