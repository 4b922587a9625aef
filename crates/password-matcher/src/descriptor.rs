//! Parsing of loosely-typed secret records into [`SecretDescriptor`]s.
//!
//! The parser only performs generic structural checks (required fields present, correct JSON
//! types, positive iteration count). Whether a given algorithm needs a salt, accepts an
//! iteration count, or understands an extra parameter is decided by its matcher.

use core::fmt;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::VerifyError;

pub const ALGORITHM_FIELD: &str = "algorithm";
pub const HASH_FIELD: &str = "hash";
pub const SALT_FIELD: &str = "salt";
pub const ITERATIONS_FIELD: &str = "iterations";

/// Field names used by the credentials service's `hashed-password` secret type.
const ALGORITHM_ALIAS: &str = "hash-function";
const HASH_ALIAS: &str = "pwd-hash";

const KNOWN_FIELDS: [&str; 6] = [
    ALGORITHM_FIELD,
    ALGORITHM_ALIAS,
    HASH_FIELD,
    HASH_ALIAS,
    SALT_FIELD,
    ITERATIONS_FIELD,
];

/// Describes how a stored password was hashed.
///
/// Built fresh for every verification and dropped when the call returns. The `Debug` output
/// redacts the hash and salt.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretDescriptor {
    algorithm: String,
    hash: String,
    salt: Option<String>,
    iterations: Option<u32>,
    extras: BTreeMap<String, Value>,
}

impl SecretDescriptor {
    pub fn new(algorithm: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            hash: hash.into(),
            salt: None,
            iterations: None,
            extras: BTreeMap::new(),
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Parse a secret record such as one fetched from a credentials store.
    ///
    /// `algorithm` and `hash` may also be spelled `hash-function` and `pwd-hash`; a record that
    /// carries both spellings of the same field is rejected. `null` optional fields count as
    /// absent. Unknown keys are preserved in [`SecretDescriptor::extras`].
    pub fn parse(record: &Value) -> Result<Self, VerifyError> {
        let obj = record
            .as_object()
            .ok_or_else(|| VerifyError::malformed("secret", "is not an object"))?;

        let algorithm = required_string(obj, ALGORITHM_FIELD, Some(ALGORITHM_ALIAS))?;
        let hash = required_string(obj, HASH_FIELD, Some(HASH_ALIAS))?;

        let salt = match lookup(obj, SALT_FIELD, None)? {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(VerifyError::malformed(SALT_FIELD, "must be a string")),
        };

        let iterations = lookup(obj, ITERATIONS_FIELD, None)?
            .map(parse_iterations)
            .transpose()?;

        let extras = obj
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let descriptor = Self {
            algorithm,
            hash,
            salt,
            iterations,
            extras,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Structural checks shared by parsed and hand-built descriptors: non-empty `algorithm`,
    /// `hash` and `salt`, and a positive iteration count.
    ///
    /// [`crate::Verifier`] runs this before dispatching to a matcher, so descriptors assembled
    /// with [`SecretDescriptor::new`] and the `with_*` methods are held to the same rules as
    /// parsed records.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.algorithm.is_empty() {
            return Err(VerifyError::malformed(ALGORITHM_FIELD, "is empty"));
        }
        if self.hash.is_empty() {
            return Err(VerifyError::malformed(HASH_FIELD, "is empty"));
        }
        if self.salt.as_deref().is_some_and(str::is_empty) {
            return Err(VerifyError::malformed(SALT_FIELD, "is empty"));
        }
        if self.iterations == Some(0) {
            return Err(VerifyError::malformed(ITERATIONS_FIELD, "must be greater than zero"));
        }
        Ok(())
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The stored hash exactly as it appears in the record (encoding is algorithm-specific).
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }

    pub fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }
}

impl fmt::Debug for SecretDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDescriptor")
            .field("algorithm", &self.algorithm)
            .field("hash", &"<redacted>")
            .field("salt", &self.salt.as_ref().map(|_| "<redacted>"))
            .field("iterations", &self.iterations)
            .field("extras", &self.extras.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn lookup<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    alias: Option<&'static str>,
) -> Result<Option<&'a Value>, VerifyError> {
    let primary = obj.get(field).filter(|v| !v.is_null());
    let aliased = alias.and_then(|a| obj.get(a)).filter(|v| !v.is_null());
    match (primary, aliased) {
        (Some(_), Some(_)) => Err(VerifyError::malformed(
            field,
            "is ambiguous (field and its alias are both present)",
        )),
        (Some(v), None) | (None, Some(v)) => Ok(Some(v)),
        (None, None) => Ok(None),
    }
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
    alias: Option<&'static str>,
) -> Result<String, VerifyError> {
    match lookup(obj, field, alias)? {
        None => Err(VerifyError::malformed(field, "is missing")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(VerifyError::malformed(field, "must be a string")),
    }
}

/// Accepts a JSON integer or a string of ASCII digits fitting a `u32`. Zero is rejected later by
/// [`SecretDescriptor::validate`].
fn parse_iterations(value: &Value) -> Result<u32, VerifyError> {
    let raw = match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            VerifyError::malformed(ITERATIONS_FIELD, "must be a positive integer")
        })?,
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
            .parse::<u64>()
            .map_err(|_| VerifyError::malformed(ITERATIONS_FIELD, "is out of range"))?,
        _ => {
            return Err(VerifyError::malformed(
                ITERATIONS_FIELD,
                "must be a positive integer",
            ))
        }
    };
    u32::try_from(raw).map_err(|_| VerifyError::malformed(ITERATIONS_FIELD, "is out of range"))
}
