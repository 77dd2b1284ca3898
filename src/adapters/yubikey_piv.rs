//! PIV (Personal Identity Verification) implementation of the smartcard ports
//!
//! This module drives a real YubiKey through the yubikey crate's PIV
//! functionality. Keys are only ever used on the card: the host sends a
//! digest (padded for RSA) and receives a signature.

use tracing::debug;
use x509_cert::der::Encode;
use yubikey::piv::sign_data;
use yubikey::{Certificate, Context, YubiKey};

use crate::error::{DeviceError, DeviceResult};
use crate::model::{Algorithm, IdentityCertificate, Pin, Slot};
use crate::ports::{CertificateReader, DeviceFinder, DigestSigner, PinVerifier};

/// DER prefix of a SHA-256 `DigestInfo` (RFC 8017 9.2, note 1)
const SHA256_DIGEST_INFO_PREFIX: &[u8] = &[
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

/// PIV-based YubiKey device finder
///
/// Finds and connects to YubiKey devices using PC/SC.
#[derive(Debug, Clone, Default)]
pub struct PivDeviceFinder;

impl DeviceFinder for PivDeviceFinder {
    type Device = PivYubiKey;

    fn find_first(&self) -> DeviceResult<Self::Device> {
        let mut readers = Context::open().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to open PC/SC context: {}", e),
        })?;

        for reader in readers.iter().map_err(|e| DeviceError::ConnectionFailed {
            reason: format!("Failed to iterate readers: {}", e),
        })? {
            if let Ok(yk) = reader.open() {
                debug!("Connected to YubiKey: {:?}", reader.name());
                return Ok(PivYubiKey::new(yk));
            }
        }

        Err(DeviceError::NotFound)
    }
}

/// Open PIV session with one YubiKey
///
/// The session is closed when the handle is dropped.
pub struct PivYubiKey {
    device: YubiKey,
}

impl PivYubiKey {
    pub fn new(device: YubiKey) -> Self {
        Self { device }
    }
}

impl PinVerifier for PivYubiKey {
    fn verify_pin(&mut self, pin: &Pin) -> DeviceResult<()> {
        self.device
            .verify_pin(pin.as_bytes())
            .map_err(|e| DeviceError::PinVerificationFailed {
                reason: e.to_string(),
            })?;

        debug!("PIN verified successfully");
        Ok(())
    }
}

impl CertificateReader for PivYubiKey {
    fn certificate(&mut self, slot: Slot) -> DeviceResult<IdentityCertificate> {
        let certificate =
            Certificate::read(&mut self.device, slot.to_yubikey_slot_id()).map_err(|e| {
                match e {
                    yubikey::Error::NotFound => DeviceError::CertificateNotFound {
                        slot: slot.to_string(),
                    },
                    other => DeviceError::from(other),
                }
            })?;

        let der = certificate
            .cert
            .to_der()
            .map_err(|e| DeviceError::YubikeyLib(format!("Failed to encode certificate: {}", e)))?;

        debug!("Read {} byte certificate from slot {}", der.len(), slot);
        Ok(IdentityCertificate::from_der(der)?)
    }
}

impl DigestSigner for PivYubiKey {
    fn sign_digest(
        &mut self,
        digest: &[u8],
        slot: Slot,
        algorithm: Algorithm,
    ) -> DeviceResult<Vec<u8>> {
        let input = match algorithm.rsa_modulus_len() {
            Some(modulus_len) => pkcs1v15_pad(digest, modulus_len)?,
            None => digest.to_vec(),
        };

        debug!(
            "Signing {} byte digest using slot {}, algorithm {:?}",
            digest.len(),
            slot,
            algorithm
        );

        let signature = sign_data(
            &mut self.device,
            &input,
            algorithm.to_yubikey_algorithm_id(),
            slot.to_yubikey_slot_id(),
        )
        .map_err(|e| DeviceError::SignatureFailed {
            reason: format!("Signing failed: {}", e),
        })?;

        debug!("Signature generated successfully");
        Ok(signature.to_vec())
    }
}

/// EMSA-PKCS1-v1_5 encoding of a SHA-256 digest, as the card performs raw RSA
pub(crate) fn pkcs1v15_pad(digest: &[u8], modulus_len: usize) -> DeviceResult<Vec<u8>> {
    let t_len = SHA256_DIGEST_INFO_PREFIX.len() + digest.len();
    if digest.len() != 32 || modulus_len < t_len + 11 {
        return Err(DeviceError::SignatureFailed {
            reason: format!(
                "cannot pad {} byte digest for {} byte modulus",
                digest.len(),
                modulus_len
            ),
        });
    }

    let mut encoded = Vec::with_capacity(modulus_len);
    encoded.extend_from_slice(&[0x00, 0x01]);
    encoded.resize(modulus_len - t_len - 1, 0xff);
    encoded.push(0x00);
    encoded.extend_from_slice(SHA256_DIGEST_INFO_PREFIX);
    encoded.extend_from_slice(digest);
    Ok(encoded)
}
