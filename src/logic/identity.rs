//! Resolution of a user id (as passed by `git -u`) against a certificate

use thiserror::Error;

use crate::model::IdentityCertificate;

/// What a user id string refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserId {
    /// An RFC 822 address to look up in the certificate's SANs
    Email(String),
    /// Hex certificate fingerprint, without the `0x` prefix
    Fingerprint(String),
}

impl UserId {
    /// Classify a user id string.
    ///
    /// Accepted forms:
    /// - `Full Name (comment) <email@example.com>`
    /// - `email@example.com`
    /// - a hex fingerprint, optionally prefixed with `0x`
    pub fn parse(user_id: &str) -> Result<Self, IdentityError> {
        if let Some(start) = user_id.find('<') {
            let rest = &user_id[start + 1..];
            let end = rest.find('>').ok_or_else(|| IdentityError::Malformed {
                user_id: user_id.to_string(),
            })?;
            let email = &rest[..end];
            if email.is_empty() {
                return Err(IdentityError::Malformed {
                    user_id: user_id.to_string(),
                });
            }
            return Ok(UserId::Email(email.to_string()));
        }

        if user_id.contains('@') {
            return Ok(UserId::Email(user_id.to_string()));
        }

        let fingerprint = user_id.strip_prefix("0x").unwrap_or(user_id);
        Ok(UserId::Fingerprint(fingerprint.to_string()))
    }
}

/// Check that `certificate` is the identity named by `user_id`
pub fn matches(certificate: &IdentityCertificate, user_id: &str) -> Result<(), IdentityError> {
    match UserId::parse(user_id)? {
        UserId::Email(email) => {
            if certificate.email_addresses().iter().any(|san| *san == email) {
                Ok(())
            } else {
                Err(IdentityError::EmailNotFound { email })
            }
        }
        UserId::Fingerprint(fingerprint) => {
            if certificate.fingerprint().eq_ignore_ascii_case(&fingerprint) {
                Ok(())
            } else {
                Err(IdentityError::FingerprintNotFound { fingerprint })
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no certificate found with email {email}")]
    EmailNotFound { email: String },

    #[error("no certificate found with fingerprint {fingerprint}")]
    FingerprintNotFound { fingerprint: String },

    #[error("malformed user id {user_id:?}: missing closing '>' or empty address")]
    Malformed { user_id: String },
}
