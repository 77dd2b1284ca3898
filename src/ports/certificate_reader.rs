//! CertificateReader trait - capability to read the identity certificate

use crate::error::DeviceResult;
use crate::model::{IdentityCertificate, Slot};

/// Capability to read the X.509 certificate stored alongside a slot key
pub trait CertificateReader {
    /// # Errors
    ///
    /// Returns `DeviceError::CertificateNotFound` for an empty slot and
    /// `DeviceError::Certificate` if the stored object does not parse
    fn certificate(&mut self, slot: Slot) -> DeviceResult<IdentityCertificate>;
}
