use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::{FailureKind, MatcherRegistry, SecretDescriptor, VerifierOptions, VerifyError};

/// Entry point used by the login path.
///
/// Cloning is cheap; clones share one immutable [`MatcherRegistry`].
#[derive(Clone)]
pub struct Verifier {
    registry: Arc<MatcherRegistry>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(VerifierOptions::default())
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Verifier {
    /// A verifier using the built-in matchers bounded by `options`.
    pub fn new(options: VerifierOptions) -> Self {
        Self::with_registry(MatcherRegistry::with_default_matchers(&options))
    }

    pub fn with_registry(registry: MatcherRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    /// Returns `true` only if `raw_password` matches `secret`.
    ///
    /// Wrong passwords, malformed or unsupported secrets, and failures inside a hashing primitive
    /// all yield `false`; nothing is returned or raised that would tell them apart.
    pub fn matches(&self, raw_password: &str, secret: &Value) -> bool {
        let outcome = SecretDescriptor::parse(secret)
            .and_then(|descriptor| self.verify(raw_password, &descriptor));
        fold_outcome(outcome)
    }

    /// Like [`Verifier::matches`] for a descriptor that has already been parsed.
    pub fn matches_descriptor(&self, raw_password: &str, descriptor: &SecretDescriptor) -> bool {
        fold_outcome(self.verify(raw_password, descriptor))
    }

    fn verify(&self, raw_password: &str, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        descriptor.validate()?;
        let matcher = self.registry.resolve(descriptor.algorithm())?;
        // A matcher (or the primitive behind it) panicking must not take the login path down.
        panic::catch_unwind(AssertUnwindSafe(|| matcher.verify(raw_password, descriptor)))
            .unwrap_or_else(|payload| {
                Err(VerifyError::ComputationFault(format!(
                    "matcher `{}` panicked: {}",
                    descriptor.algorithm(),
                    panic_message(payload.as_ref())
                )))
            })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn fold_outcome(outcome: Result<(), VerifyError>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(err) => {
            match err.kind() {
                FailureKind::Mismatch | FailureKind::Invalid => {
                    log::debug!("password verification failed: {err}");
                }
                FailureKind::Fault => {
                    log::warn!("password verification failed: {err}");
                }
            }
            false
        }
    }
}
