//! JWT access and refresh tokens.

mod claims;
mod codec;

pub use claims::{Claims, TokenType};
pub use codec::{TokenCodec, TokenError, TokenPair};
