use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// PIV key slot holding an identity certificate and its private key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 9a
    Authentication,
    /// 9c
    Signature,
    /// 9d
    KeyManagement,
    /// 9e
    CardAuthentication,
}

impl Slot {
    pub fn default_signing() -> Self {
        Self::Signature
    }

    /// Hex identifier used by PIV tooling (`9a`, `9c`, ...)
    pub fn hex_id(self) -> &'static str {
        match self {
            Slot::Authentication => "9a",
            Slot::Signature => "9c",
            Slot::KeyManagement => "9d",
            Slot::CardAuthentication => "9e",
        }
    }

    pub fn to_yubikey_slot_id(self) -> yubikey::piv::SlotId {
        match self {
            Slot::Authentication => yubikey::piv::SlotId::Authentication,
            Slot::Signature => yubikey::piv::SlotId::Signature,
            Slot::KeyManagement => yubikey::piv::SlotId::KeyManagement,
            Slot::CardAuthentication => yubikey::piv::SlotId::CardAuthentication,
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::default_signing()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex_id())
    }
}

impl FromStr for Slot {
    type Err = SlotError;

    /// Accepts the hex id (`9c`, `0x9c`) or the slot name (`signature`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix("0x").unwrap_or(&normalized);

        match normalized {
            "9a" | "authentication" => Ok(Slot::Authentication),
            "9c" | "signature" => Ok(Slot::Signature),
            "9d" | "key-management" | "keymanagement" => Ok(Slot::KeyManagement),
            "9e" | "card-authentication" | "cardauthentication" => {
                Ok(Slot::CardAuthentication)
            }
            _ => Err(SlotError::Unsupported {
                slot: s.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Slot not supported: {slot}")]
    Unsupported { slot: String },
}
