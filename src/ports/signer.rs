//! DigestSigner trait - capability to sign a digest with a resident key

use crate::error::DeviceResult;
use crate::model::{Algorithm, Slot};

/// Capability to sign a precomputed digest with a key that never leaves the card
pub trait DigestSigner {
    /// Sign `digest` using the key in `slot`
    ///
    /// # Arguments
    ///
    /// * `digest` - Output of [`Algorithm::digest`] for the message being signed
    /// * `slot` - The slot containing the key to use
    /// * `algorithm` - Algorithm of the resident key
    ///
    /// # Returns
    ///
    /// The signature bytes: DER `ECDSA-Sig-Value` for EC keys, the raw
    /// PKCS#1 v1.5 signature for RSA keys
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The slot holds no key
    /// - PIN verification is required and has not happened
    /// - Signing operation fails
    fn sign_digest(&mut self, digest: &[u8], slot: Slot, algorithm: Algorithm)
        -> DeviceResult<Vec<u8>>;
}
