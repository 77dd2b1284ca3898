//! Sign git commits and tags with an S/MIME certificate held on a PIV smartcard
//!
//! The private key stays on the card; the host builds a CMS `SignedData`
//! structure around a signature the card computes over a digest.

mod adapters;
pub mod api;
pub mod error;
mod logic;
pub mod model;
pub mod ports;
pub mod status;
pub mod use_cases;

// Re-export commonly used types
pub use error::{PivitError, PivitResult};
pub use logic::{IdentityError, UserId};

// Re-export public API
pub use api::sign;
