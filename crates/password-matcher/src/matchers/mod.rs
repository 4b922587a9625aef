//! Built-in [`crate::Matcher`] implementations.

mod argon2;
mod bcrypt;
mod digest;
mod plain;

pub use self::argon2::Argon2Matcher;
pub use self::bcrypt::BcryptMatcher;
pub use self::digest::{iterated_digest, DigestAlgorithm, SaltEncoding, SaltedDigestMatcher};
pub use self::plain::PlainMatcher;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;

use crate::VerifyError;

/// Decode a standard-alphabet base64 field, with or without padding.
fn decode_base64(field: &'static str, value: &str) -> Result<Vec<u8>, VerifyError> {
    STANDARD
        .decode(value)
        .or_else(|_| STANDARD_NO_PAD.decode(value))
        .map_err(|_| VerifyError::malformed(field, "is not valid base64"))
}
