//! use selftls::error::SelfTlsError;

use thiserror::Error;

/// Represents errors that can occur while issuing or inspecting a certificate.
///
/// Every failure aborts the operation; nothing is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelfTlsError {
    /// The RSA key pair could not be generated.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// The random source failed while drawing the serial number.
    #[error("Serial number generation error: {0}")]
    SerialGenerationError(String),

    /// The certificate could not be encoded or signed, or its signature did not verify.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SelfTlsError>;

impl From<der::Error> for SelfTlsError {
    /// Converts a `der::Error` into a `SelfTlsError`.
    fn from(err: der::Error) -> Self {
        SelfTlsError::DecodingError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for SelfTlsError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        SelfTlsError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for SelfTlsError {
    fn from(err: pem::PemError) -> Self {
        SelfTlsError::DecodingError(err.to_string())
    }
}
