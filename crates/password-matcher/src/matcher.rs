use zeroize::Zeroizing;

use crate::ct::ct_eq;
use crate::{SecretDescriptor, VerifyError};

/// One password hashing family.
///
/// Implementations are registered in a [`crate::MatcherRegistry`] under [`Matcher::id`] and must
/// be usable from many threads at once; they hold configuration only, never per-call state.
pub trait Matcher: Send + Sync {
    /// Identifier matched (case-sensitively) against a secret's `algorithm` field.
    fn id(&self) -> &str;

    /// Algorithm-specific checks: required fields present, parameters within bounds, stored hash
    /// decodable. Runs before any hashing.
    fn validate(&self, descriptor: &SecretDescriptor) -> Result<(), VerifyError>;

    /// Re-derive the hash of `password` using the parameters stored in `descriptor`.
    fn compute(
        &self,
        password: &str,
        descriptor: &SecretDescriptor,
    ) -> Result<Zeroizing<Vec<u8>>, VerifyError>;

    /// Decode the stored hash into the byte form produced by [`Matcher::compute`].
    fn expected(&self, descriptor: &SecretDescriptor) -> Result<Zeroizing<Vec<u8>>, VerifyError>;

    /// Compare a computed hash with the stored one. Must not exit early on content.
    fn compare(&self, computed: &[u8], stored: &[u8]) -> bool {
        ct_eq(computed, stored)
    }

    /// validate → expected → compute → compare.
    fn verify(&self, password: &str, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        self.validate(descriptor)?;
        let stored = self.expected(descriptor)?;
        let computed = self.compute(password, descriptor)?;
        if self.compare(&computed, &stored) {
            Ok(())
        } else {
            Err(VerifyError::Mismatch)
        }
    }
}
