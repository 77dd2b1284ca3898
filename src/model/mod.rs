mod algorithm;
mod certificate;
mod pin;
mod request;
mod slot;

pub use algorithm::{Algorithm, AlgorithmError};
pub use certificate::{CertificateError, IdentityCertificate};
pub use pin::{Pin, PinError};
pub use request::SigningRequest;
pub use slot::{Slot, SlotError};

#[cfg(test)]
pub(crate) use certificate::testdata;
