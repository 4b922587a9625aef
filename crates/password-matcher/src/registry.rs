use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::matchers::{
    Argon2Matcher, BcryptMatcher, DigestAlgorithm, PlainMatcher, SaltedDigestMatcher,
};
use crate::{Matcher, VerifierOptions, VerifyError};

/// Immutable mapping from algorithm identifier to matcher.
///
/// Built once at startup through [`MatcherRegistry::builder`]; afterwards it is only read, so a
/// single instance can be shared by any number of threads without locking.
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: BTreeMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    pub fn builder() -> MatcherRegistryBuilder {
        MatcherRegistryBuilder::default()
    }

    /// Registry holding the built-in matchers, bounded by `options`.
    pub fn with_default_matchers(options: &VerifierOptions) -> Self {
        Self::builder().with_defaults(options).build()
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, algorithm: &str) -> Result<&dyn Matcher, VerifyError> {
        self.matchers
            .get(algorithm)
            .map(|m| &**m)
            .ok_or_else(|| VerifyError::UnsupportedAlgorithm(algorithm.to_string()))
    }

    pub fn contains(&self, algorithm: &str) -> bool {
        self.matchers.contains_key(algorithm)
    }

    /// Registered identifiers in sorted order.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.matchers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.algorithms()).finish()
    }
}

#[derive(Default)]
pub struct MatcherRegistryBuilder {
    matchers: BTreeMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistryBuilder {
    /// Add `matcher` under its own id. A later registration of the same id replaces the earlier.
    pub fn register<M: Matcher + 'static>(self, matcher: M) -> Self {
        self.register_shared(Arc::new(matcher))
    }

    pub fn register_shared(mut self, matcher: Arc<dyn Matcher>) -> Self {
        let id = matcher.id().to_string();
        if self.matchers.insert(id.clone(), matcher).is_some() {
            log::debug!("password matcher `{id}` re-registered; replacing previous entry");
        }
        self
    }

    /// Register the built-in matchers:
    /// `plain` (unless disabled), `salted-iterated`, `sha-1`, `sha-256`, `sha-512`, `bcrypt`,
    /// `argon2`.
    pub fn with_defaults(mut self, options: &VerifierOptions) -> Self {
        if options.allow_plain {
            self = self.register(PlainMatcher);
        }
        self.register(SaltedDigestMatcher::salted_iterated(options.max_iterations))
            .register(SaltedDigestMatcher::hashed_password(
                DigestAlgorithm::Sha1,
                options.max_iterations,
            ))
            .register(SaltedDigestMatcher::hashed_password(
                DigestAlgorithm::Sha256,
                options.max_iterations,
            ))
            .register(SaltedDigestMatcher::hashed_password(
                DigestAlgorithm::Sha512,
                options.max_iterations,
            ))
            .register(BcryptMatcher::new(options.max_bcrypt_cost))
            .register(Argon2Matcher::new(
                options.max_argon2_memory_kib,
                options.max_argon2_iterations,
                options.max_argon2_parallelism,
            ))
    }

    pub fn build(self) -> MatcherRegistry {
        MatcherRegistry {
            matchers: self.matchers,
        }
    }
}
