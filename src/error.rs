//! Error types for pivit
//!
//! Every stage of the signing workflow has its own top-level variant whose
//! message starts with a short, stable context string (`open PIV for
//! signing`, `sign message`, ...). Stage variants wrap the lower level
//! error that caused them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::logic::IdentityError;
use crate::model::{AlgorithmError, CertificateError};

/// Result type alias for pivit operations
pub type PivitResult<T> = Result<T, PivitError>;

/// Result type alias for smartcard port operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Top-level error type, one variant per signing stage
#[derive(Error, Debug)]
pub enum PivitError {
    #[error("open PIV for signing: {0}")]
    OpenSession(#[source] DeviceError),

    #[error("get identity certificate: {0}")]
    FetchCertificate(#[source] DeviceError),

    #[error("no suitable certificate found: {0}")]
    IdentityMismatch(#[from] IdentityError),

    #[error("open message file ({}): {source}", path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read message to sign: {0}")]
    ReadInput(#[source] io::Error),

    #[error("sign message: {0}")]
    Sign(#[source] SignatureError),

    #[error("add timestamp to signature: {0}")]
    Timestamp(#[source] SignatureError),

    #[error("set certificates in signature: {0}")]
    SetCertificates(#[source] SignatureError),

    #[error("serialize signature: {0}")]
    Serialize(#[source] SignatureError),

    #[error("write signature: {0}")]
    WriteOutput(#[source] io::Error),
}

/// Smartcard errors
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No YubiKey device found
    #[error("No YubiKey device found - please connect a YubiKey")]
    NotFound,

    /// YubiKey device connection failed
    #[error("Failed to connect to YubiKey device: {reason}")]
    ConnectionFailed { reason: String },

    /// PIN verification failed
    #[error("PIN verification failed: {reason}")]
    PinVerificationFailed { reason: String },

    /// Slot holds no certificate
    #[error("No certificate found in slot {slot}")]
    CertificateNotFound { slot: String },

    /// Slot certificate could not be parsed
    #[error("Invalid certificate: {0}")]
    Certificate(#[from] CertificateError),

    /// Slot key cannot be driven through PIV
    #[error("{0}")]
    Algorithm(#[from] AlgorithmError),

    /// Card refused or failed the signing operation
    #[error("Failed to generate signature: {reason}")]
    SignatureFailed { reason: String },

    /// Underlying yubikey crate error
    #[error("YubiKey library error: {0}")]
    YubikeyLib(String),
}

/// Errors raised while building or encoding the CMS structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Serialization was requested before a signer was set
    #[error("message has not been signed")]
    NotSigned,

    /// Smartcard signing failed during encoding
    #[error("{reason}")]
    Signing { reason: String },

    /// Time-stamp authority URL is unusable
    #[error("invalid time-stamp authority URL {url}: {reason}")]
    InvalidTimestampUrl { url: String, reason: String },

    /// Time-stamp token could not be obtained
    #[error("{reason}")]
    Timestamp { reason: String },

    /// Certificate chain was empty
    #[error("certificate chain is empty")]
    EmptyChain,

    /// DER encoding failed
    #[error("{reason}")]
    Encoding { reason: String },
}

/// Convert yubikey crate errors to our error type
impl From<yubikey::Error> for DeviceError {
    fn from(err: yubikey::Error) -> Self {
        DeviceError::YubikeyLib(err.to_string())
    }
}
