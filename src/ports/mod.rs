//! Ports (traits) for smartcard operations
//!
//! These traits define the capabilities the signing workflow needs from a
//! smartcard. The core depends on these abstractions, not on the PIV
//! adapter, so the workflow can run against a software fake in tests.

mod certificate_reader;
mod device_finder;
mod pin_verifier;
mod signer;

pub use certificate_reader::CertificateReader;
pub use device_finder::DeviceFinder;
pub use pin_verifier::PinVerifier;
pub use signer::DigestSigner;

/// Everything a signing session needs from an open device
pub trait SigningSession: PinVerifier + CertificateReader + DigestSigner {}

// Blanket implementation for types that implement all operation traits
impl<T> SigningSession for T where T: PinVerifier + CertificateReader + DigestSigner {}
