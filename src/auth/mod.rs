/// Authentication module
///
/// Token issuing/verification, password hashing, and the service that
/// ties them to the credential store.

mod claims;
mod jwt;
mod password;
mod service;

pub use claims::{Claims, TokenKind};
pub use jwt::{TokenCodec, TokenPair};
pub use password::PasswordHasher;
pub use service::{AuthService, UserProfile};
