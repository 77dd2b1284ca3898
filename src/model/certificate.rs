//! Identity certificate read from a PIV slot

use bytes::Bytes;
use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_certificate::{CapturedX509Certificate, KeyAlgorithm};
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::{FromDer, X509Certificate};

use super::{Algorithm, AlgorithmError};

/// X.509 certificate bound to a smartcard-resident key
///
/// Only public material lives here. The key that matches it never leaves
/// the card; signing goes through a [`crate::ports::DigestSigner`].
#[derive(Clone, Debug)]
pub struct IdentityCertificate {
    certificate: CapturedX509Certificate,
    email_addresses: Vec<String>,
    key_bits: usize,
    fingerprint: String,
}

impl IdentityCertificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CertificateError> {
        let certificate = CapturedX509Certificate::from_der(der.into())
            .map_err(|e| CertificateError::Malformed { reason: e.to_string() })?;
        Self::from_captured(certificate)
    }

    /// Parse a PEM-encoded certificate
    pub fn from_pem(pem: impl AsRef<[u8]>) -> Result<Self, CertificateError> {
        let certificate = CapturedX509Certificate::from_pem(pem)
            .map_err(|e| CertificateError::Malformed { reason: e.to_string() })?;
        Self::from_captured(certificate)
    }

    fn from_captured(certificate: CapturedX509Certificate) -> Result<Self, CertificateError> {
        let der = certificate.constructed_data();

        let (_, parsed) = X509Certificate::from_der(der)
            .map_err(|e| CertificateError::Malformed { reason: e.to_string() })?;

        let mut email_addresses = Vec::new();
        let san = parsed
            .subject_alternative_name()
            .map_err(|e| CertificateError::Malformed { reason: e.to_string() })?;
        if let Some(san) = san {
            for name in san.value.general_names.iter() {
                if let GeneralName::RFC822Name(email) = name {
                    email_addresses.push(email.to_string());
                }
            }
        }

        let key_bits = parsed
            .public_key()
            .parsed()
            .map(|key| key.key_size())
            .unwrap_or_default();

        let fingerprint = hex::encode(Sha256::digest(der));

        Ok(Self {
            certificate,
            email_addresses,
            key_bits,
            fingerprint,
        })
    }

    /// RFC 822 names from the subjectAltName extension, in certificate order
    pub fn email_addresses(&self) -> &[String] {
        &self.email_addresses
    }

    /// Lowercase hex SHA-256 of the DER encoding
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn der(&self) -> &[u8] {
        self.certificate.constructed_data()
    }

    pub fn subject_common_name(&self) -> Option<String> {
        self.certificate.subject_common_name()
    }

    pub fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        self.certificate.key_algorithm()
    }

    /// PIV algorithm of the key paired with this certificate
    pub fn algorithm(&self) -> Result<Algorithm, AlgorithmError> {
        let key = self.key_algorithm().ok_or_else(|| AlgorithmError::Unsupported {
            algorithm: self.certificate.key_algorithm_oid().to_string(),
        })?;
        Algorithm::from_key_algorithm(key, self.key_bits)
    }

    /// Raw subjectPublicKey bytes
    pub fn public_key_data(&self) -> Bytes {
        self.certificate.public_key_data()
    }

    pub fn captured(&self) -> &CapturedX509Certificate {
        &self.certificate
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("Malformed certificate: {reason}")]
    Malformed { reason: String },
}
