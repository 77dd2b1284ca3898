use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use pivit::api::{Pin, SigningRequest, Slot};

/// Command line compatible with the subset of gpg that git uses for signing
#[derive(Parser, Debug)]
#[command(name = "pivit")]
#[command(about = "Sign data with an S/MIME certificate on a PIV smartcard", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Make a signature
    #[arg(short = 's', long)]
    pub sign: bool,

    /// Make a detached signature (implies --sign)
    #[arg(short = 'b', long)]
    pub detach_sign: bool,

    /// Create ASCII armored output
    #[arg(short = 'a', long)]
    pub armor: bool,

    /// Email, "Name <email>" or certificate fingerprint to sign as
    #[arg(short = 'u', long, value_name = "USER-ID")]
    pub local_user: Option<String>,

    /// Write GnuPG status lines to this file descriptor
    #[arg(long, value_name = "FD")]
    pub status_fd: Option<i32>,

    /// RFC 3161 time-stamp authority URL
    #[arg(long, value_name = "URL")]
    pub timestamp_authority: Option<String>,

    /// PIV slot holding the signing key (9a, 9c, 9d, 9e)
    #[arg(long, env = "PIVIT_SLOT", default_value = "9c")]
    pub slot: Slot,

    /// PIN to unlock the key, if the slot's PIN policy requires it
    #[arg(long, env = "PIVIT_PIN", hide_env_values = true)]
    pub pin: Option<Pin>,

    /// File to sign; standard input is read unless exactly one is given
    pub files: Vec<PathBuf>,
}

impl Cli {
    fn into_request(self) -> anyhow::Result<SigningRequest> {
        let Some(user_id) = self.local_user else {
            bail!("--local-user is required to select the signing identity");
        };

        Ok(SigningRequest {
            slot: self.slot,
            detach: self.detach_sign,
            armor: self.armor,
            user_id,
            timestamp_authority: self.timestamp_authority,
            file_args: self.files,
            status_fd: self.status_fd,
            pin: self.pin,
            signing_time: None,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    if !cli.sign && !cli.detach_sign {
        bail!("nothing to do: specify --sign or --detach-sign");
    }

    let request = cli.into_request()?;
    pivit::sign(&request).context("failed to sign")?;

    Ok(())
}
