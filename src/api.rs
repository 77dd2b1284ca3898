//! Entry points wired to the real PIV device and process streams

use std::io;

use crate::adapters::PivDeviceFinder;
use crate::error::PivitResult;
use crate::use_cases::{sign as sign_use_case, Streams};

pub use crate::model::*;

/// Sign standard input (or the request's single file) with the first YubiKey found
///
/// The signature goes to standard output; status lines go to
/// `request.status_fd`.
pub fn sign(request: &SigningRequest) -> PivitResult<()> {
    let finder = PivDeviceFinder;
    let streams = Streams {
        input: io::stdin().lock(),
        output: io::stdout().lock(),
        status: None,
    };
    sign_use_case(&finder, request, streams)
}
