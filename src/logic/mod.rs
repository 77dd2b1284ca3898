pub mod identity;
pub mod signed_message;

pub use identity::{matches, IdentityError, UserId};
pub use signed_message::{armor, SignedMessage};
