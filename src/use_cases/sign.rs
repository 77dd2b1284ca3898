//! Sign use case
//!
//! Produces a CMS signature over a document with the key in a PIV slot and
//! reports progress on the GnuPG status channel, the way git expects from
//! `gpg.x509.program`.

use std::fs::File;
use std::io::{Read, Write};

use tracing::{debug, info, warn};

use crate::adapters::remote_signer::{RemoteSigner, SignOutcome};
use crate::error::{DeviceError, PivitError, PivitResult, SignatureError};
use crate::logic::{self, armor, SignedMessage};
use crate::model::SigningRequest;
use crate::ports::{CertificateReader, DeviceFinder, PinVerifier};
use crate::status::StatusEmitter;

/// Byte streams used by one signing operation
pub struct Streams<'a, R, W> {
    /// Read when the request does not name exactly one file
    pub input: R,
    /// Receives the DER or PEM signature
    pub output: W,
    /// Status sink overriding `SigningRequest::status_fd`
    pub status: Option<Box<dyn Write + 'a>>,
}

/// Sign the request's input with the identity in the request's slot
///
/// This function orchestrates the complete signing workflow:
/// 1. Open the first available device (and verify the PIN if one is given)
/// 2. Read the slot certificate and check it against the user id
/// 3. Read the message
/// 4. Build, sign, optionally time-stamp and encode the CMS structure
/// 5. Emit status lines and write the signature
///
/// Nothing is written to `output` unless every step succeeds.
///
/// # Errors
///
/// Returns the `PivitError` variant of the first stage that failed
pub fn sign<F, R, W>(
    finder: &F,
    request: &SigningRequest,
    streams: Streams<'_, R, W>,
) -> PivitResult<()>
where
    F: DeviceFinder,
    R: Read,
    W: Write,
{
    let Streams {
        mut input,
        mut output,
        status,
    } = streams;

    let mut device = finder.find_first().map_err(PivitError::OpenSession)?;
    if let Some(pin) = &request.pin {
        device.verify_pin(pin).map_err(PivitError::OpenSession)?;
    }

    let certificate = device
        .certificate(request.slot)
        .map_err(PivitError::FetchCertificate)?;
    let algorithm = certificate
        .algorithm()
        .map_err(|e| PivitError::FetchCertificate(DeviceError::Algorithm(e)))?;
    debug!(
        "Slot {} holds {:?} certificate {}",
        request.slot,
        algorithm,
        certificate.fingerprint()
    );

    logic::matches(&certificate, &request.user_id)?;

    let mut status = match status {
        Some(sink) => StatusEmitter::with_writer(sink),
        None => StatusEmitter::setup(request.status_fd),
    };

    let mut content = Vec::new();
    match request.input_file() {
        Some(path) => {
            let mut file = File::open(path).map_err(|source| PivitError::OpenInput {
                path: path.clone(),
                source,
            })?;
            file.read_to_end(&mut content)
                .map_err(PivitError::ReadInput)?;
        }
        None => {
            if request.file_args.len() > 1 {
                warn!(
                    "{} file arguments given, signing standard input instead",
                    request.file_args.len()
                );
            }
            input
                .read_to_end(&mut content)
                .map_err(PivitError::ReadInput)?;
        }
    }
    debug!("Read {} byte message", content.len());

    let signer = RemoteSigner::new(&mut device, request.slot, &certificate, algorithm);
    let mut message = SignedMessage::new(content);
    message.sign(&signer, &certificate);
    if let Some(time) = request.signing_time {
        message.set_signing_time(time);
    }

    status.emit_begin_signing();

    if request.detach {
        message.detach();
    }

    if let Some(url) = &request.timestamp_authority {
        message.add_timestamps(url).map_err(PivitError::Timestamp)?;
        debug!("Time-stamp authority: {}", url);
    }

    message
        .set_certificates(vec![certificate.captured().clone()])
        .map_err(PivitError::SetCertificates)?;

    let der = message.into_der().map_err(|e| {
        attribute_encoding_failure(e, signer.outcome(), request.timestamp_authority.is_some())
    })?;

    status.emit_sig_created(&certificate, request.detach, algorithm);

    let written = if request.armor {
        output.write_all(armor(&der).as_bytes())
    } else {
        output.write_all(&der)
    };
    written
        .and_then(|_| output.flush())
        .map_err(PivitError::WriteOutput)?;

    info!(
        "Created {} signature ({} bytes) with certificate {}",
        if request.detach { "detached" } else { "inline" },
        der.len(),
        certificate.fingerprint()
    );
    Ok(())
}

/// Signing, time-stamping and encoding run in one pass; blame the right stage
fn attribute_encoding_failure(
    error: SignatureError,
    outcome: SignOutcome,
    timestamped: bool,
) -> PivitError {
    match outcome {
        SignOutcome::Failed { reason } => PivitError::Sign(SignatureError::Signing { reason }),
        SignOutcome::Signed if timestamped => PivitError::Timestamp(SignatureError::Timestamp {
            reason: error.to_string(),
        }),
        _ => PivitError::Serialize(error),
    }
}
