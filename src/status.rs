//! GnuPG `--status-fd` protocol
//!
//! git reads these lines to learn that a signature was made and by whom.
//! Emission is best-effort: a broken status channel never fails a signing
//! operation.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;
use x509_certificate::KeyAlgorithm;

use crate::model::{Algorithm, IdentityCertificate};

const STATUS_PREFIX: &str = "[GNUPG:]";

/// Writer of `[GNUPG:]` status lines
///
/// Each event is written at most once and `BEGIN_SIGNING` always comes
/// before `SIG_CREATED`.
pub struct StatusEmitter<'a> {
    sink: Option<Box<dyn Write + 'a>>,
    began: bool,
    created: bool,
}

impl<'a> StatusEmitter<'a> {
    /// Emitter that writes nothing
    pub fn disabled() -> Self {
        Self {
            sink: None,
            began: false,
            created: false,
        }
    }

    pub fn with_writer(writer: impl Write + 'a) -> Self {
        Self {
            sink: Some(Box::new(writer)),
            began: false,
            created: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn emit_begin_signing(&mut self) {
        if self.began {
            return;
        }
        self.began = true;
        self.write_line("BEGIN_SIGNING");
    }

    /// `SIG_CREATED <D|S> <pk_algo> <hash_algo> 00 <unix_time> <FPR>`
    pub fn emit_sig_created(
        &mut self,
        certificate: &IdentityCertificate,
        detached: bool,
        algorithm: Algorithm,
    ) {
        if self.created {
            return;
        }
        self.emit_begin_signing();
        self.created = true;

        let kind = if detached { 'D' } else { 'S' };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let line = format!(
            "SIG_CREATED {} {} {} 00 {} {}",
            kind,
            openpgp_pk_algo(certificate.key_algorithm()),
            algorithm.openpgp_hash_id(),
            now,
            certificate.fingerprint().to_uppercase()
        );
        self.write_line(&line);
    }

    fn write_line(&mut self, line: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let result = writeln!(sink, "{} {}", STATUS_PREFIX, line).and_then(|_| sink.flush());
        if let Err(e) = result {
            debug!("Failed to write status line: {}", e);
        }
    }
}

impl StatusEmitter<'static> {
    /// Emitter for a `--status-fd` value
    ///
    /// `None` and values <= 0 disable status output. 1 and 2 are the process
    /// stdout and stderr; any other descriptor is written to but never closed.
    pub fn setup(fd: Option<i32>) -> Self {
        match fd {
            None => Self::disabled(),
            Some(fd) if fd <= 0 => Self::disabled(),
            Some(1) => Self::with_writer(io::stdout()),
            Some(2) => Self::with_writer(io::stderr()),
            Some(fd) => Self::from_raw_fd(fd),
        }
    }

    #[cfg(unix)]
    fn from_raw_fd(fd: i32) -> Self {
        use std::fs::File;
        use std::os::fd::BorrowedFd;

        // SAFETY: the descriptor was passed open by the parent process and is
        // only borrowed long enough to duplicate it; the caller's fd is never
        // closed.
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        match borrowed.try_clone_to_owned() {
            Ok(owned) => Self::with_writer(File::from(owned)),
            Err(e) => {
                debug!("Status fd {} unusable: {}", fd, e);
                Self::disabled()
            }
        }
    }

    #[cfg(not(unix))]
    fn from_raw_fd(fd: i32) -> Self {
        debug!("Status fd {} is not supported on this platform", fd);
        Self::disabled()
    }
}

/// OpenPGP public key algorithm id (RFC 4880 9.1, RFC 9580 9.1)
fn openpgp_pk_algo(key: Option<KeyAlgorithm>) -> u8 {
    match key {
        Some(KeyAlgorithm::Rsa) => 1,
        Some(KeyAlgorithm::Ecdsa(_)) => 19,
        Some(KeyAlgorithm::Ed25519) => 22,
        None => 0,
    }
}
