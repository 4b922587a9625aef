//! Argon2 secrets in PHC string format (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`).
//!
//! Memory, time and parallelism costs are read from the encoded string and bounded before any
//! memory is allocated for the hash.

use ::argon2::password_hash::{PasswordHash, Salt};
use ::argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::descriptor::HASH_FIELD;
use crate::{Matcher, SecretDescriptor, VerifyError};

struct Argon2Parts<'a> {
    algorithm: Algorithm,
    version: Version,
    params: Params,
    salt: Salt<'a>,
    hash_len: usize,
    hash: &'a [u8],
}

// Argon2 refuses salts shorter than this; the PHC grammar alone allows 3-byte salts.
const MIN_SALT_LEN: usize = 8;

fn malformed(reason: impl Into<String>) -> VerifyError {
    VerifyError::malformed(HASH_FIELD, reason)
}

fn decode_salt<'b>(salt: Salt<'_>, buf: &'b mut [u8]) -> Result<&'b [u8], VerifyError> {
    let raw = salt
        .decode_b64(buf)
        .map_err(|e| malformed(format!("has an undecodable argon2 salt: {e}")))?;
    if raw.len() < MIN_SALT_LEN {
        return Err(malformed(format!(
            "has a {}-byte argon2 salt (minimum {MIN_SALT_LEN})",
            raw.len()
        )));
    }
    Ok(raw)
}

/// Adaptive, memory-hard Argon2 matcher (`argon2id`, `argon2i`, `argon2d`).
#[derive(Debug, Clone, Copy)]
pub struct Argon2Matcher {
    max_memory_kib: u32,
    max_iterations: u32,
    max_parallelism: u32,
}

impl Argon2Matcher {
    pub fn new(max_memory_kib: u32, max_iterations: u32, max_parallelism: u32) -> Self {
        Self {
            max_memory_kib,
            max_iterations,
            max_parallelism,
        }
    }

    fn parts<'a>(&self, phc: &'a PasswordHash<'a>) -> Result<Argon2Parts<'a>, VerifyError> {
        let algorithm = Algorithm::new(phc.algorithm.as_str())
            .map_err(|_| malformed(format!("names unknown algorithm `{}`", phc.algorithm)))?;
        let version = match phc.version {
            None => Version::default(),
            Some(v) => {
                Version::try_from(v).map_err(|_| malformed(format!("has unknown version {v}")))?
            }
        };
        let params =
            Params::try_from(phc).map_err(|e| malformed(format!("has invalid parameters: {e}")))?;

        let bounds = [
            ("argon2 memory cost", params.m_cost(), self.max_memory_kib),
            ("argon2 time cost", params.t_cost(), self.max_iterations),
            ("argon2 parallelism", params.p_cost(), self.max_parallelism),
        ];
        for (parameter, value, max) in bounds {
            if value > max {
                return Err(VerifyError::CostTooLarge {
                    parameter,
                    value: u64::from(value),
                    max: u64::from(max),
                });
            }
        }

        let salt = phc.salt.ok_or_else(|| malformed("has no argon2 salt"))?;
        let hash = phc.hash.as_ref().ok_or_else(|| malformed("has no argon2 hash"))?;

        Ok(Argon2Parts {
            algorithm,
            version,
            params,
            salt,
            hash_len: hash.len(),
            hash: hash.as_bytes(),
        })
    }
}

fn parse_phc(encoded: &str) -> Result<PasswordHash<'_>, VerifyError> {
    PasswordHash::new(encoded).map_err(|e| malformed(format!("is not a PHC string: {e}")))
}

impl Matcher for Argon2Matcher {
    fn id(&self) -> &str {
        "argon2"
    }

    fn validate(&self, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        let phc = parse_phc(descriptor.hash())?;
        let parts = self.parts(&phc)?;
        let mut salt_buf = [0u8; Salt::MAX_LENGTH];
        decode_salt(parts.salt, &mut salt_buf)?;
        Ok(())
    }

    fn compute(
        &self,
        password: &str,
        descriptor: &SecretDescriptor,
    ) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        let phc = parse_phc(descriptor.hash())?;
        let parts = self.parts(&phc)?;

        let mut salt_buf = [0u8; Salt::MAX_LENGTH];
        let salt = decode_salt(parts.salt, &mut salt_buf)?;

        let mut out = Zeroizing::new(vec![0u8; parts.hash_len]);
        Argon2::new(parts.algorithm, parts.version, parts.params)
            .hash_password_into(password.as_bytes(), salt, &mut out)
            .map_err(|e| VerifyError::ComputationFault(format!("argon2: {e}")))?;
        Ok(out)
    }

    fn expected(&self, descriptor: &SecretDescriptor) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        let phc = parse_phc(descriptor.hash())?;
        let parts = self.parts(&phc)?;
        Ok(Zeroizing::new(parts.hash.to_vec()))
    }
}
