//! Bridge between the CMS builder and a key that never leaves the card
//!
//! The CMS encoder asks for a signature over the DER-encoded signed
//! attributes. [`RemoteSigner`] digests them on the host and forwards the
//! digest to the smartcard through a [`DigestSigner`].

use std::cell::RefCell;

use bytes::Bytes;
use tracing::{debug, warn};
use x509_certificate::{
    KeyAlgorithm, KeyInfoSigner, Sign, Signature, SignatureAlgorithm, Signer,
    X509CertificateError,
};
use zeroize::Zeroizing;

use crate::model::{Algorithm, IdentityCertificate, Slot};
use crate::ports::DigestSigner;

/// What happened the last time the card was asked to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    NotAttempted,
    Signed,
    Failed { reason: String },
}

/// `KeyInfoSigner` whose private key lives in a PIV slot
pub struct RemoteSigner<'a, D: DigestSigner> {
    device: RefCell<&'a mut D>,
    slot: Slot,
    algorithm: Algorithm,
    key_algorithm: Option<KeyAlgorithm>,
    public_key: Bytes,
    outcome: RefCell<SignOutcome>,
}

impl<'a, D: DigestSigner> RemoteSigner<'a, D> {
    /// Signer for the key in `slot`, described by the certificate stored beside it
    pub fn new(
        device: &'a mut D,
        slot: Slot,
        certificate: &IdentityCertificate,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            device: RefCell::new(device),
            slot,
            algorithm,
            key_algorithm: certificate.key_algorithm(),
            public_key: certificate.public_key_data(),
            outcome: RefCell::new(SignOutcome::NotAttempted),
        }
    }

    pub fn outcome(&self) -> SignOutcome {
        self.outcome.borrow().clone()
    }
}

impl<D: DigestSigner> Signer<Signature> for RemoteSigner<'_, D> {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
        let digest = self.algorithm.digest(msg);
        debug!(
            "Requesting card signature over {} byte message (slot {})",
            msg.len(),
            self.slot
        );

        let result = self
            .device
            .borrow_mut()
            .sign_digest(&digest, self.slot, self.algorithm);

        match result {
            Ok(signature) => {
                *self.outcome.borrow_mut() = SignOutcome::Signed;
                Ok(signature.into())
            }
            Err(e) => {
                warn!("Card signing failed: {}", e);
                *self.outcome.borrow_mut() = SignOutcome::Failed {
                    reason: e.to_string(),
                };
                Err(signature::Error::from_source(e))
            }
        }
    }
}

impl<D: DigestSigner> Sign for RemoteSigner<'_, D> {
    fn sign(&self, message: &[u8]) -> Result<(Vec<u8>, SignatureAlgorithm), X509CertificateError> {
        let signature = self
            .try_sign(message)
            .map_err(|e| X509CertificateError::Other(e.to_string()))?;
        Ok((signature.into(), self.algorithm.signature_algorithm()))
    }

    fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        self.key_algorithm
    }

    fn public_key_data(&self) -> Bytes {
        self.public_key.clone()
    }

    fn signature_algorithm(&self) -> Result<SignatureAlgorithm, X509CertificateError> {
        Ok(self.algorithm.signature_algorithm())
    }

    fn private_key_data(&self) -> Option<Zeroizing<Vec<u8>>> {
        None
    }

    fn rsa_primes(
        &self,
    ) -> Result<Option<(Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>)>, X509CertificateError> {
        Ok(None)
    }
}

impl<D: DigestSigner> KeyInfoSigner for RemoteSigner<'_, D> {}
