use super::SigningSession;
use crate::error::DeviceResult;

/// Capability to find and open a smartcard
pub trait DeviceFinder {
    type Device: SigningSession;

    /// Open a session with the first available device
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::NotFound` if no device is connected
    fn find_first(&self) -> DeviceResult<Self::Device>;
}
