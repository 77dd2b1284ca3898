//! Key algorithms supported by PIV slots

use sha2::{Digest, Sha256, Sha384};
use thiserror::Error;
use x509_certificate::{EcdsaCurve, KeyAlgorithm, SignatureAlgorithm};

/// Cryptographic algorithm of a key resident in a PIV slot
///
/// The algorithm is never chosen by the caller: it is derived from the
/// public key of the certificate stored next to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// RSA 1024-bit
    Rsa1024,
    /// RSA 2048-bit
    Rsa2048,
    /// ECDSA P-256
    EcdsaP256,
    /// ECDSA P-384
    EcdsaP384,
}

impl Algorithm {
    /// Map a certificate key algorithm (and RSA modulus size in bits) to a PIV algorithm
    ///
    /// # Errors
    ///
    /// Returns `AlgorithmError::Unsupported` for keys a PIV slot cannot hold
    pub fn from_key_algorithm(key: KeyAlgorithm, key_bits: usize) -> Result<Self, AlgorithmError> {
        match key {
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp256r1) => Ok(Algorithm::EcdsaP256),
            KeyAlgorithm::Ecdsa(EcdsaCurve::Secp384r1) => Ok(Algorithm::EcdsaP384),
            KeyAlgorithm::Rsa if key_bits == 1024 => Ok(Algorithm::Rsa1024),
            KeyAlgorithm::Rsa if key_bits == 2048 => Ok(Algorithm::Rsa2048),
            other => Err(AlgorithmError::Unsupported {
                algorithm: format!("{:?} ({} bits)", other, key_bits),
            }),
        }
    }

    /// Convert to yubikey crate's AlgorithmId
    pub fn to_yubikey_algorithm_id(self) -> yubikey::piv::AlgorithmId {
        match self {
            Algorithm::Rsa1024 => yubikey::piv::AlgorithmId::Rsa1024,
            Algorithm::Rsa2048 => yubikey::piv::AlgorithmId::Rsa2048,
            Algorithm::EcdsaP256 => yubikey::piv::AlgorithmId::EccP256,
            Algorithm::EcdsaP384 => yubikey::piv::AlgorithmId::EccP384,
        }
    }

    /// Length in bytes of an RSA modulus, `None` for EC keys
    pub fn rsa_modulus_len(self) -> Option<usize> {
        match self {
            Algorithm::Rsa1024 => Some(128),
            Algorithm::Rsa2048 => Some(256),
            Algorithm::EcdsaP256 | Algorithm::EcdsaP384 => None,
        }
    }

    /// Signature algorithm advertised in the CMS SignerInfo
    pub fn signature_algorithm(self) -> SignatureAlgorithm {
        match self {
            Algorithm::Rsa1024 | Algorithm::Rsa2048 => SignatureAlgorithm::RsaSha256,
            Algorithm::EcdsaP256 => SignatureAlgorithm::EcdsaSha256,
            Algorithm::EcdsaP384 => SignatureAlgorithm::EcdsaSha384,
        }
    }

    /// Digest the message with the hash paired with this algorithm
    pub fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::EcdsaP384 => Sha384::digest(message).to_vec(),
            _ => Sha256::digest(message).to_vec(),
        }
    }

    /// OpenPGP hash algorithm id (RFC 4880 9.4) of [`Algorithm::digest`]
    pub fn openpgp_hash_id(self) -> u8 {
        match self {
            Algorithm::EcdsaP384 => 9,
            _ => 8,
        }
    }
}

/// Errors that can occur when working with algorithms
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    /// Key algorithm cannot be used from a PIV slot
    #[error("Algorithm not supported: {algorithm}")]
    Unsupported { algorithm: String },
}
