//! CMS SignedData under construction
//!
//! The CMS encoder signs, time-stamps and encodes in a single pass, so this
//! type only collects the pieces and validates what it can up front. Nothing
//! is produced until [`SignedMessage::into_der`] succeeds.

use chrono::{DateTime, Utc};
use cryptographic_message_syntax::{SignedDataBuilder, SignerBuilder};
use tracing::debug;
use x509_certificate::asn1time::UtcTime;
use x509_certificate::{CapturedX509Certificate, KeyInfoSigner};

use crate::error::SignatureError;
use crate::model::IdentityCertificate;

/// PEM label of armored signatures
pub const PEM_TAG: &str = "SIGNED MESSAGE";

pub struct SignedMessage<'a> {
    content: Vec<u8>,
    detached: bool,
    signer: Option<SignerBuilder<'a>>,
    signing_time: Option<DateTime<Utc>>,
    certificates: Vec<CapturedX509Certificate>,
}

impl<'a> SignedMessage<'a> {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            detached: false,
            signer: None,
            signing_time: None,
            certificates: Vec::new(),
        }
    }

    /// Register the single signer of this message
    pub fn sign(&mut self, signer: &'a dyn KeyInfoSigner, certificate: &IdentityCertificate) {
        self.signer = Some(SignerBuilder::new(signer, certificate.captured().clone()));
        debug!("Signer registered: {:?}", certificate.subject_common_name());
    }

    /// Record `time` as the signing-time attribute instead of the current time
    pub fn set_signing_time(&mut self, time: DateTime<Utc>) {
        self.signing_time = Some(time);
    }

    /// Leave the content out of the encoded structure
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Request an RFC 3161 token for the signature from `url`
    pub fn add_timestamps(&mut self, url: &str) -> Result<(), SignatureError> {
        let signer = self.signer.take().ok_or(SignatureError::NotSigned)?;
        let signer =
            signer
                .time_stamp_url(url)
                .map_err(|e| SignatureError::InvalidTimestampUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        self.signer = Some(signer);
        Ok(())
    }

    /// Certificates embedded in the SignedData, leaf first
    pub fn set_certificates(
        &mut self,
        chain: Vec<CapturedX509Certificate>,
    ) -> Result<(), SignatureError> {
        if chain.is_empty() {
            return Err(SignatureError::EmptyChain);
        }
        self.certificates = chain;
        Ok(())
    }

    /// Sign and encode. Signing and time-stamping happen here.
    pub fn into_der(self) -> Result<Vec<u8>, SignatureError> {
        let signer = self.signer.ok_or(SignatureError::NotSigned)?;

        let mut builder = if self.detached {
            SignedDataBuilder::default().content_external(self.content)
        } else {
            SignedDataBuilder::default().content_inline(self.content)
        };
        builder = builder.signer(signer);
        if let Some(time) = self.signing_time {
            builder = builder.signing_time(UtcTime::from(time));
        }
        for certificate in self.certificates {
            builder = builder.certificate(certificate);
        }

        builder.build_der().map_err(|e| SignatureError::Encoding {
            reason: e.to_string(),
        })
    }
}

/// PEM-armor a DER signature with LF line endings
pub fn armor(der: &[u8]) -> String {
    let block = pem::Pem::new(PEM_TAG, der.to_vec());
    pem::encode_config(
        &block,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}
