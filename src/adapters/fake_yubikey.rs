//! Software smartcard for exercising the signing workflow without hardware

use std::collections::HashMap;

use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::pkcs8::DecodePrivateKey;
use rsa::hazmat::rsa_decrypt_and_check;
use rsa::rand_core::CryptoRngCore;
use rsa::{BigUint, RsaPrivateKey};

use crate::adapters::yubikey_piv::pkcs1v15_pad;
use crate::error::{DeviceError, DeviceResult};
use crate::model::testdata::{
    ALICE_CERT_PEM, ALICE_KEY_PKCS8, BOB_CERT_PEM, BOB_KEY_PKCS8, CAROL_CERT_PEM,
    CAROL_KEY_PKCS8,
};
use crate::model::{Algorithm, IdentityCertificate, Pin, Slot};
use crate::ports::{CertificateReader, DeviceFinder, DigestSigner, PinVerifier};

/// Private key held by the fake card
#[derive(Debug, Clone)]
pub enum FakeKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    Rsa(RsaPrivateKey),
}

impl FakeKey {
    fn from_pkcs8(algorithm: Algorithm, der: &[u8]) -> Self {
        match algorithm {
            Algorithm::EcdsaP256 => {
                Self::P256(p256::ecdsa::SigningKey::from_pkcs8_der(der).unwrap())
            }
            Algorithm::EcdsaP384 => {
                Self::P384(p384::ecdsa::SigningKey::from_pkcs8_der(der).unwrap())
            }
            Algorithm::Rsa1024 | Algorithm::Rsa2048 => {
                Self::Rsa(RsaPrivateKey::from_pkcs8_der(der).unwrap())
            }
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            Self::P256(_) => Algorithm::EcdsaP256,
            Self::P384(_) => Algorithm::EcdsaP384,
            Self::Rsa(_) => Algorithm::Rsa2048,
        }
    }

    /// Same output format as the card: DER ECDSA or a raw RSA block
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, String> {
        match self {
            Self::P256(key) => {
                let signature: p256::ecdsa::Signature =
                    key.sign_prehash(digest).map_err(|e| e.to_string())?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Self::P384(key) => {
                let signature: p384::ecdsa::Signature =
                    key.sign_prehash(digest).map_err(|e| e.to_string())?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Self::Rsa(key) => {
                let modulus_len = 256;
                let padded = pkcs1v15_pad(digest, modulus_len).map_err(|e| e.to_string())?;
                let raw = rsa_decrypt_and_check(
                    key,
                    None::<&mut dyn CryptoRngCore>,
                    &BigUint::from_bytes_be(&padded),
                )
                .map_err(|e| e.to_string())?
                .to_bytes_be();

                let mut block = vec![0u8; modulus_len - raw.len()];
                block.extend_from_slice(&raw);
                Ok(block)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeYubiKey {
    pub pin: Pin,
    pub certificates: HashMap<Slot, IdentityCertificate>,
    pub keys: HashMap<Slot, FakeKey>,
    pub pin_verified: bool,
    /// Refuse to sign until the PIN was verified
    pub require_pin: bool,
    /// Make every signing operation fail, as an unplugged card would
    pub fail_signing: bool,
}

impl FakeYubiKey {
    pub fn new(pin: Pin) -> Self {
        Self {
            pin,
            certificates: HashMap::new(),
            keys: HashMap::new(),
            pin_verified: false,
            require_pin: false,
            fail_signing: false,
        }
    }

    /// Device with the given identity in the signature slot
    pub fn with_identity(cert_pem: &str, key_pkcs8: &[u8]) -> Self {
        let certificate = IdentityCertificate::from_pem(cert_pem).unwrap();
        let key = FakeKey::from_pkcs8(certificate.algorithm().unwrap(), key_pkcs8);

        let mut device = Self::new("123456".parse().unwrap());
        device.certificates.insert(Slot::Signature, certificate);
        device.keys.insert(Slot::Signature, key);
        device
    }

    /// alice@example.com, P-256
    pub fn with_alice() -> Self {
        Self::with_identity(ALICE_CERT_PEM, ALICE_KEY_PKCS8)
    }

    /// bob@example.com, RSA-2048
    pub fn with_bob() -> Self {
        Self::with_identity(BOB_CERT_PEM, BOB_KEY_PKCS8)
    }

    /// carol@example.com, P-384
    pub fn with_carol() -> Self {
        Self::with_identity(CAROL_CERT_PEM, CAROL_KEY_PKCS8)
    }
}

impl PinVerifier for FakeYubiKey {
    fn verify_pin(&mut self, pin: &Pin) -> DeviceResult<()> {
        if pin.as_bytes() == self.pin.as_bytes() {
            self.pin_verified = true;
            Ok(())
        } else {
            Err(DeviceError::PinVerificationFailed {
                reason: "Invalid PIN".to_string(),
            })
        }
    }
}

impl CertificateReader for FakeYubiKey {
    fn certificate(&mut self, slot: Slot) -> DeviceResult<IdentityCertificate> {
        self.certificates
            .get(&slot)
            .cloned()
            .ok_or_else(|| DeviceError::CertificateNotFound {
                slot: slot.to_string(),
            })
    }
}

impl DigestSigner for FakeYubiKey {
    fn sign_digest(
        &mut self,
        digest: &[u8],
        slot: Slot,
        algorithm: Algorithm,
    ) -> DeviceResult<Vec<u8>> {
        if self.fail_signing {
            return Err(DeviceError::SignatureFailed {
                reason: "card removed".to_string(),
            });
        }
        if self.require_pin && !self.pin_verified {
            return Err(DeviceError::SignatureFailed {
                reason: "security status not satisfied".to_string(),
            });
        }

        let key = self
            .keys
            .get(&slot)
            .ok_or_else(|| DeviceError::SignatureFailed {
                reason: format!("no key in slot {}", slot),
            })?;
        if key.algorithm() != algorithm {
            return Err(DeviceError::SignatureFailed {
                reason: format!(
                    "slot {} holds a {:?} key, asked for {:?}",
                    slot,
                    key.algorithm(),
                    algorithm
                ),
            });
        }

        key.sign(digest)
            .map_err(|reason| DeviceError::SignatureFailed { reason })
    }
}

pub struct FakeDeviceFinder {
    pub device: Option<FakeYubiKey>,
}

impl DeviceFinder for FakeDeviceFinder {
    type Device = FakeYubiKey;

    fn find_first(&self) -> DeviceResult<Self::Device> {
        self.device.clone().ok_or(DeviceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::smartcard_contract;

    contract_tests_for!(
        fake_yubikey_contract,
        make = FakeYubiKey::with_alice,
        tests = {
            test_pin_verification_success => smartcard_contract::test_pin_verification_success,
            test_pin_verification_failure => smartcard_contract::test_pin_verification_failure,
            test_read_certificate_success => smartcard_contract::test_read_certificate_success,
            test_read_certificate_empty_slot => smartcard_contract::test_read_certificate_empty_slot,
            test_sign_key_not_found => smartcard_contract::test_sign_key_not_found,
            test_sign_digest_success => smartcard_contract::test_sign_digest_success,
        }
    );

    #[test]
    fn test_sign_requires_pin_when_configured() {
        let mut device = FakeYubiKey::with_alice();
        device.require_pin = true;
        let digest = Algorithm::EcdsaP256.digest(b"data");

        assert!(device
            .sign_digest(&digest, Slot::Signature, Algorithm::EcdsaP256)
            .is_err());

        device.verify_pin(&"123456".parse().unwrap()).unwrap();
        assert!(device
            .sign_digest(&digest, Slot::Signature, Algorithm::EcdsaP256)
            .is_ok());
    }

    #[test]
    fn test_rsa_signature_verifies_as_pkcs1v15() {
        use rsa::Pkcs1v15Sign;

        let mut device = FakeYubiKey::with_bob();
        let digest = Algorithm::Rsa2048.digest(b"data");

        let signature = device
            .sign_digest(&digest, Slot::Signature, Algorithm::Rsa2048)
            .unwrap();
        assert_eq!(signature.len(), 256);

        let key = match device.keys.get(&Slot::Signature) {
            Some(FakeKey::Rsa(key)) => key.to_public_key(),
            other => panic!("expected RSA key, got {other:?}"),
        };
        key.verify(Pkcs1v15Sign::new::<sha2::Sha256>(), &digest, &signature)
            .expect("PKCS#1 v1.5 signature");
    }

    #[test]
    fn test_p384_signature_verifies() {
        use p384::ecdsa::signature::hazmat::PrehashVerifier;
        use p384::ecdsa::{Signature, VerifyingKey};

        let mut device = FakeYubiKey::with_carol();
        let digest = Algorithm::EcdsaP384.digest(b"data");

        let signature = device
            .sign_digest(&digest, Slot::Signature, Algorithm::EcdsaP384)
            .unwrap();

        let key = match device.keys.get(&Slot::Signature) {
            Some(FakeKey::P384(key)) => VerifyingKey::from(key),
            other => panic!("expected P-384 key, got {other:?}"),
        };
        key.verify_prehash(&digest, &Signature::from_der(&signature).unwrap())
            .expect("P-384 signature");
    }

    #[test]
    fn test_sign_rejects_algorithm_of_other_key() {
        let mut device = FakeYubiKey::with_carol();
        let digest = Algorithm::EcdsaP256.digest(b"data");

        assert!(matches!(
            device.sign_digest(&digest, Slot::Signature, Algorithm::EcdsaP256),
            Err(DeviceError::SignatureFailed { .. })
        ));
    }

    #[test]
    fn test_finder_without_device() {
        let finder = FakeDeviceFinder { device: None };
        assert!(matches!(finder.find_first(), Err(DeviceError::NotFound)));
    }
}
