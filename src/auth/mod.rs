//! Authentication: password hashing, session tokens and the request identity.

mod error;
mod identity;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use identity::Identity;
pub use jwt::{Claims, TokenIssuer};
