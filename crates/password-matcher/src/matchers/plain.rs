use zeroize::Zeroizing;

use crate::descriptor::HASH_FIELD;
use crate::{Matcher, SecretDescriptor, VerifyError};

/// Legacy records whose stored "hash" is the password itself.
///
/// Only kept so old unhashed records keep working; disable through
/// [`crate::VerifierOptions::allow_plain`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMatcher;

impl Matcher for PlainMatcher {
    fn id(&self) -> &str {
        "plain"
    }

    fn validate(&self, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        if descriptor.hash().is_empty() {
            return Err(VerifyError::malformed(HASH_FIELD, "is empty"));
        }
        Ok(())
    }

    fn compute(
        &self,
        password: &str,
        _descriptor: &SecretDescriptor,
    ) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        Ok(Zeroizing::new(password.as_bytes().to_vec()))
    }

    fn expected(&self, descriptor: &SecretDescriptor) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        Ok(Zeroizing::new(descriptor.hash().as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ct::{ct_eq_call_count, reset_ct_eq_calls};

    #[test]
    fn plain_is_exact_and_case_sensitive() {
        let d = SecretDescriptor::new("plain", "hello");
        assert_eq!(PlainMatcher.verify("hello", &d), Ok(()));
        assert_eq!(PlainMatcher.verify("Hello", &d), Err(VerifyError::Mismatch));
        assert_eq!(PlainMatcher.verify("hello ", &d), Err(VerifyError::Mismatch));
        assert_eq!(PlainMatcher.verify("", &d), Err(VerifyError::Mismatch));
    }

    #[test]
    fn empty_stored_password_never_matches() {
        let d = SecretDescriptor::new("plain", "");
        assert!(matches!(
            PlainMatcher.validate(&d),
            Err(VerifyError::MalformedSecret { field: "hash", .. })
        ));
        assert!(PlainMatcher.verify("", &d).is_err());
    }

    #[test]
    fn plain_uses_constant_time_compare() {
        reset_ct_eq_calls();
        let d = SecretDescriptor::new("plain", "hello");
        let _ = PlainMatcher.verify("jello", &d);
        assert!(
            ct_eq_call_count() >= 1,
            "expected constant-time compare helper to be invoked"
        );
    }
}
