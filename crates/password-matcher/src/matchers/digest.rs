//! Salted, iterated message-digest secrets.
//!
//! The stored hash is derived as:
//!
//! 1. `H = Digest(salt || password_utf8)`
//! 2. repeated `iterations - 1` more times: `H = Digest(H)`
//!
//! With `iterations = 1` (or absent) this is the single salted digest used by the credentials
//! service's `sha-1`/`sha-256`/`sha-512` hashed-password secrets.

use zeroize::Zeroizing;

use super::decode_base64;
use crate::descriptor::{HASH_FIELD, ITERATIONS_FIELD, SALT_FIELD};
use crate::{Matcher, SecretDescriptor, VerifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    fn hash_into(self, data: &[u8], out: &mut [u8]) {
        match self {
            DigestAlgorithm::Sha1 => {
                use sha1::Digest as _;
                let digest = sha1::Sha1::digest(data);
                out.copy_from_slice(&digest);
            }
            DigestAlgorithm::Sha256 => {
                use sha2::Digest as _;
                let digest = sha2::Sha256::digest(data);
                out.copy_from_slice(&digest);
            }
            DigestAlgorithm::Sha512 => {
                use sha2::Digest as _;
                let digest = sha2::Sha512::digest(data);
                out.copy_from_slice(&digest);
            }
        }
    }
}

/// How the `salt` string of a secret maps to salt bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltEncoding {
    /// Standard base64 (credentials-service records).
    Base64,
    /// The UTF-8 bytes of the string, verbatim.
    Utf8,
}

/// Compute the iterated salted digest of `password`. `iterations` of 0 is treated as 1.
pub fn iterated_digest(
    algorithm: DigestAlgorithm,
    salt: &[u8],
    password: &[u8],
    iterations: u32,
) -> Zeroizing<Vec<u8>> {
    let digest_len = algorithm.output_len();
    let mut h = Zeroizing::new(vec![0u8; digest_len]);

    let mut buf = Zeroizing::new(Vec::with_capacity(salt.len() + password.len()));
    buf.extend_from_slice(salt);
    buf.extend_from_slice(password);
    algorithm.hash_into(&buf[..], &mut h[..]);

    // Reuse one scratch buffer for every round.
    let mut round = Zeroizing::new(vec![0u8; digest_len]);
    for _ in 1..iterations {
        round.copy_from_slice(&h);
        algorithm.hash_into(&round[..], &mut h[..]);
    }

    h
}

/// Matcher for salted (optionally iterated) SHA digests with a base64-encoded stored hash.
#[derive(Debug, Clone)]
pub struct SaltedDigestMatcher {
    id: String,
    algorithm: DigestAlgorithm,
    salt_encoding: SaltEncoding,
    salt_required: bool,
    iterations_required: bool,
    max_iterations: u32,
}

impl SaltedDigestMatcher {
    /// A matcher with optional salt and iteration count, base64 salt encoding.
    pub fn new(id: impl Into<String>, algorithm: DigestAlgorithm, max_iterations: u32) -> Self {
        Self {
            id: id.into(),
            algorithm,
            salt_encoding: SaltEncoding::Base64,
            salt_required: false,
            iterations_required: false,
            max_iterations,
        }
    }

    /// `salted-iterated`: SHA-256, salt (UTF-8) and iteration count both mandatory.
    pub fn salted_iterated(max_iterations: u32) -> Self {
        Self::new("salted-iterated", DigestAlgorithm::Sha256, max_iterations)
            .with_salt_encoding(SaltEncoding::Utf8)
            .require_salt()
            .require_iterations()
    }

    /// Credentials-service hashed-password functions: `sha-1`, `sha-256`, `sha-512`.
    pub fn hashed_password(algorithm: DigestAlgorithm, max_iterations: u32) -> Self {
        let id = match algorithm {
            DigestAlgorithm::Sha1 => "sha-1",
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha512 => "sha-512",
        };
        Self::new(id, algorithm, max_iterations)
    }

    pub fn with_salt_encoding(mut self, encoding: SaltEncoding) -> Self {
        self.salt_encoding = encoding;
        self
    }

    pub fn require_salt(mut self) -> Self {
        self.salt_required = true;
        self
    }

    pub fn require_iterations(mut self) -> Self {
        self.iterations_required = true;
        self
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn salt_bytes(&self, descriptor: &SecretDescriptor) -> Result<Vec<u8>, VerifyError> {
        match descriptor.salt() {
            None if self.salt_required => Err(VerifyError::malformed(SALT_FIELD, "is missing")),
            None => Ok(Vec::new()),
            Some(salt) => match self.salt_encoding {
                SaltEncoding::Base64 => decode_base64(SALT_FIELD, salt),
                SaltEncoding::Utf8 => Ok(salt.as_bytes().to_vec()),
            },
        }
    }

    fn iterations(&self, descriptor: &SecretDescriptor) -> Result<u32, VerifyError> {
        match descriptor.iterations() {
            None if self.iterations_required => {
                Err(VerifyError::malformed(ITERATIONS_FIELD, "is missing"))
            }
            None => Ok(1),
            Some(0) => Err(VerifyError::malformed(
                ITERATIONS_FIELD,
                "must be greater than zero",
            )),
            Some(n) if n > self.max_iterations => Err(VerifyError::CostTooLarge {
                parameter: ITERATIONS_FIELD,
                value: u64::from(n),
                max: u64::from(self.max_iterations),
            }),
            Some(n) => Ok(n),
        }
    }
}

impl Matcher for SaltedDigestMatcher {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        self.salt_bytes(descriptor)?;
        self.iterations(descriptor)?;
        let stored = self.expected(descriptor)?;
        if stored.len() != self.algorithm.output_len() {
            return Err(VerifyError::malformed(
                HASH_FIELD,
                format!(
                    "has length {} (expected {} for {:?})",
                    stored.len(),
                    self.algorithm.output_len(),
                    self.algorithm
                ),
            ));
        }
        Ok(())
    }

    fn compute(
        &self,
        password: &str,
        descriptor: &SecretDescriptor,
    ) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        let salt = self.salt_bytes(descriptor)?;
        let iterations = self.iterations(descriptor)?;
        Ok(iterated_digest(
            self.algorithm,
            &salt,
            password.as_bytes(),
            iterations,
        ))
    }

    fn expected(&self, descriptor: &SecretDescriptor) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        decode_base64(HASH_FIELD, descriptor.hash()).map(Zeroizing::new)
    }
}
