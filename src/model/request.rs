use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{Pin, Slot};

/// Everything one `sign` invocation needs to know, fixed up front
#[derive(Debug, Clone, Default)]
pub struct SigningRequest {
    /// Slot holding the identity certificate and key
    pub slot: Slot,
    /// Omit the signed content from the CMS structure
    pub detach: bool,
    /// Wrap the DER output in a `SIGNED MESSAGE` PEM envelope
    pub armor: bool,
    /// Email, `Name <email>` or hex fingerprint the certificate must match
    pub user_id: String,
    /// RFC 3161 time-stamp authority
    pub timestamp_authority: Option<String>,
    /// Positional file arguments; only a single file is read, otherwise stdin
    pub file_args: Vec<PathBuf>,
    /// Descriptor for `[GNUPG:]` status lines
    pub status_fd: Option<i32>,
    pub pin: Option<Pin>,
    /// Signing time recorded in the signature; the current time when unset
    pub signing_time: Option<DateTime<Utc>>,
}

impl SigningRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// The explicit input file, if exactly one was given
    pub fn input_file(&self) -> Option<&PathBuf> {
        match self.file_args.as_slice() {
            [path] => Some(path),
            _ => None,
        }
    }
}
