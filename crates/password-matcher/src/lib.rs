//! Verification of clear-text passwords against stored hashed-password secrets.
//!
//! A secret is a loosely-typed record (usually JSON fetched from a credentials store) naming the
//! hash algorithm, the stored hash, and algorithm-specific parameters such as a salt or an
//! iteration count. [`matches`] answers whether a password corresponds to it.
//!
//! This crate currently supports:
//! - `plain`: legacy unhashed records
//! - `salted-iterated`: iterated SHA-256 over `salt || password`
//! - `sha-1`, `sha-256`, `sha-512`: credentials-service hashed-password secrets (base64 salt)
//! - `bcrypt`: `$2a$`/`$2b$`/`$2y$` encoded hashes
//! - `argon2`: PHC-encoded Argon2id/Argon2i/Argon2d hashes
//!
//! All comparisons of computed and stored hashes are constant time. Every failure (wrong
//! password, malformed or unknown secret, primitive failure) yields `false`; the underlying
//! [`VerifyError`] only surfaces in `debug`/`warn` log records. New algorithms are added by
//! implementing [`Matcher`] and registering it in a [`MatcherRegistry`].
//!
//! ```
//! use serde_json::json;
//!
//! let secret = json!({ "algorithm": "plain", "hash": "hello" });
//! assert!(password_matcher::matches("hello", &secret));
//! assert!(!password_matcher::matches("Hello", &secret));
//! ```

mod ct;
mod descriptor;
mod error;
mod matcher;
pub mod matchers;
mod options;
mod registry;
mod verifier;

use std::sync::OnceLock;

pub use crate::ct::ct_eq;
pub use crate::descriptor::{
    SecretDescriptor, ALGORITHM_FIELD, HASH_FIELD, ITERATIONS_FIELD, SALT_FIELD,
};
pub use crate::error::{FailureKind, VerifyError};
pub use crate::matcher::Matcher;
pub use crate::options::{
    VerifierOptions, DEFAULT_MAX_ARGON2_ITERATIONS, DEFAULT_MAX_ARGON2_MEMORY_KIB,
    DEFAULT_MAX_ARGON2_PARALLELISM, DEFAULT_MAX_BCRYPT_COST, DEFAULT_MAX_ITERATIONS,
};
pub use crate::registry::{MatcherRegistry, MatcherRegistryBuilder};
pub use crate::verifier::Verifier;

/// Process-wide verifier with [`VerifierOptions::default`], initialised on first use.
pub fn default_verifier() -> &'static Verifier {
    static DEFAULT: OnceLock<Verifier> = OnceLock::new();
    DEFAULT.get_or_init(Verifier::default)
}

/// Match `raw_password` against `secret` using [`default_verifier`].
pub fn matches(raw_password: &str, secret: &serde_json::Value) -> bool {
    default_verifier().matches(raw_password, secret)
}
