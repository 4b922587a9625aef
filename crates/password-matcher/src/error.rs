use thiserror::Error;

/// Internal verification failures.
///
/// These never reach the login decision path: [`crate::Verifier::matches`] folds every variant
/// into `false`. They exist so custom matchers can report what went wrong and so failures can be
/// told apart in diagnostic logs. `Display` output never includes password, salt, or hash bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed secret: `{field}` {reason}")]
    MalformedSecret { field: &'static str, reason: String },
    #[error("unsupported password hash algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error(
        "secret {parameter} {value} exceeds maximum allowed {max} (refusing to run expensive password hash)"
    )]
    CostTooLarge {
        parameter: &'static str,
        value: u64,
        max: u64,
    },
    #[error("password hash computation failed: {0}")]
    ComputationFault(String),
    #[error("password does not match")]
    Mismatch,
}

/// Coarse classification of a [`VerifyError`] for audit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Well-formed secret, wrong password.
    Mismatch,
    /// The secret could not be used (malformed, unsupported, or over the cost ceiling).
    Invalid,
    /// The hashing primitive failed on input that passed validation.
    Fault,
}

impl VerifyError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        VerifyError::MalformedSecret {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            VerifyError::Mismatch => FailureKind::Mismatch,
            VerifyError::MalformedSecret { .. }
            | VerifyError::UnsupportedAlgorithm(_)
            | VerifyError::CostTooLarge { .. } => FailureKind::Invalid,
            VerifyError::ComputationFault(_) => FailureKind::Fault,
        }
    }
}
