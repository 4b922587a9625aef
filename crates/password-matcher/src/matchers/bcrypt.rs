//! bcrypt secrets (`$2a$`, `$2b$`, `$2y$`).
//!
//! The stored hash self-describes its parameters: `$<version>$<cost>$<22 salt chars><31 hash
//! chars>`, using bcrypt's own base64 alphabet. Verification re-derives the hash with the embedded
//! salt and cost and compares the 31-character hash part.
//!
//! `$2x$` marks hashes produced by the sign-extension bug of old crypt_blowfish releases. Their
//! derivation differs for passwords with non-ASCII bytes and cannot be reproduced here, so they
//! are rejected as malformed.

use base64::alphabet::BCRYPT;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use zeroize::Zeroizing;

use crate::descriptor::HASH_FIELD;
use crate::{Matcher, SecretDescriptor, VerifyError};

const ENCODED_LEN: usize = 60;
const SALT_CHARS: usize = 22;
const HASH_CHARS: usize = 31;
const MIN_COST: u32 = 4;

// The 22-character salt carries 4 unused trailing bits.
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

struct BcryptParts<'a> {
    version: ::bcrypt::Version,
    cost: u32,
    salt: [u8; 16],
    hash: &'a str,
}

fn parse_version(tag: &str) -> Option<::bcrypt::Version> {
    match tag {
        "2a" => Some(::bcrypt::Version::TwoA),
        "2b" => Some(::bcrypt::Version::TwoB),
        "2y" => Some(::bcrypt::Version::TwoY),
        _ => None,
    }
}

fn is_bcrypt_b64(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'/'
}

fn split_hash(encoded: &str) -> Result<BcryptParts<'_>, VerifyError> {
    let bytes = encoded.as_bytes();
    if bytes.len() != ENCODED_LEN {
        return Err(VerifyError::malformed(
            HASH_FIELD,
            format!("is not a bcrypt hash (length {})", bytes.len()),
        ));
    }
    if bytes[0] != b'$' || bytes[3] != b'$' || bytes[6] != b'$' {
        return Err(VerifyError::malformed(HASH_FIELD, "is not a bcrypt hash"));
    }
    let version = encoded
        .get(1..3)
        .and_then(parse_version)
        .ok_or_else(|| VerifyError::malformed(HASH_FIELD, "has an unknown bcrypt version"))?;
    let cost = encoded
        .get(4..6)
        .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|c| c.parse::<u32>().ok())
        .ok_or_else(|| VerifyError::malformed(HASH_FIELD, "has an invalid bcrypt cost"))?;
    let rest = &bytes[7..];
    if !rest.iter().copied().all(is_bcrypt_b64) {
        return Err(VerifyError::malformed(
            HASH_FIELD,
            "contains characters outside the bcrypt alphabet",
        ));
    }

    // All remaining bytes are ASCII, so these slices fall on char boundaries.
    let salt_b64 = &encoded[7..7 + SALT_CHARS];
    let hash = &encoded[7 + SALT_CHARS..];
    debug_assert_eq!(hash.len(), HASH_CHARS);

    let salt: [u8; 16] = BCRYPT_B64
        .decode(salt_b64)
        .ok()
        .and_then(|raw| raw.try_into().ok())
        .ok_or_else(|| VerifyError::malformed(HASH_FIELD, "has an invalid bcrypt salt"))?;

    Ok(BcryptParts {
        version,
        cost,
        salt,
        hash,
    })
}

/// Adaptive bcrypt matcher with an upper bound on the embedded cost factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptMatcher {
    max_cost: u32,
}

impl BcryptMatcher {
    pub fn new(max_cost: u32) -> Self {
        Self { max_cost }
    }
}

impl Matcher for BcryptMatcher {
    fn id(&self) -> &str {
        "bcrypt"
    }

    fn validate(&self, descriptor: &SecretDescriptor) -> Result<(), VerifyError> {
        let parts = split_hash(descriptor.hash())?;
        if parts.cost < MIN_COST {
            return Err(VerifyError::malformed(
                HASH_FIELD,
                format!("has bcrypt cost {} below the minimum {MIN_COST}", parts.cost),
            ));
        }
        if parts.cost > self.max_cost {
            return Err(VerifyError::CostTooLarge {
                parameter: "bcrypt cost",
                value: u64::from(parts.cost),
                max: u64::from(self.max_cost),
            });
        }
        Ok(())
    }

    fn compute(
        &self,
        password: &str,
        descriptor: &SecretDescriptor,
    ) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        let parts = split_hash(descriptor.hash())?;
        let recomputed = ::bcrypt::hash_with_salt(password.as_bytes(), parts.cost, parts.salt)
            .map_err(|e| VerifyError::ComputationFault(format!("bcrypt: {e}")))?;
        let encoded = Zeroizing::new(recomputed.format_for_version(parts.version));
        let hash = encoded
            .get(encoded.len().saturating_sub(HASH_CHARS)..)
            .unwrap_or_default();
        Ok(Zeroizing::new(hash.as_bytes().to_vec()))
    }

    fn expected(&self, descriptor: &SecretDescriptor) -> Result<Zeroizing<Vec<u8>>, VerifyError> {
        let parts = split_hash(descriptor.hash())?;
        Ok(Zeroizing::new(parts.hash.as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ct::{ct_eq_call_count, reset_ct_eq_calls};

    const SALT: [u8; 16] = [
        0x38, 0x4B, 0x96, 0x12, 0x7F, 0x00, 0xA1, 0xC3, 0x5E, 0x21, 0x0D, 0x99, 0x4A, 0x6B, 0xE0,
        0x17,
    ];

    fn bcrypt_secret(password: &str, cost: u32, version: ::bcrypt::Version) -> String {
        ::bcrypt::hash_with_salt(password, cost, SALT)
            .expect("hash")
            .format_for_version(version)
    }

    #[test]
    fn round_trip_for_every_version_prefix() {
        let m = BcryptMatcher::new(10);
        for version in [
            ::bcrypt::Version::TwoA,
            ::bcrypt::Version::TwoB,
            ::bcrypt::Version::TwoY,
        ] {
            let d = SecretDescriptor::new("bcrypt", bcrypt_secret("hunter2", 4, version));
            assert_eq!(m.verify("hunter2", &d), Ok(()));
            assert_eq!(m.verify("hunter3", &d), Err(VerifyError::Mismatch));
        }
    }

    #[test]
    fn buggy_2x_prefix_is_rejected() {
        let m = BcryptMatcher::new(10);
        let d = SecretDescriptor::new(
            "bcrypt",
            bcrypt_secret("pässword", 4, ::bcrypt::Version::TwoX),
        );
        assert!(matches!(
            m.validate(&d),
            Err(VerifyError::MalformedSecret { field: "hash", .. })
        ));
        assert!(m.verify("pässword", &d).is_err());
    }

    #[test]
    fn agrees_with_reference_verify() {
        let encoded = bcrypt_secret("correct horse", 5, ::bcrypt::Version::TwoB);
        assert!(::bcrypt::verify("correct horse", &encoded).expect("reference verify"));

        let m = BcryptMatcher::new(10);
        let d = SecretDescriptor::new("bcrypt", encoded);
        assert_eq!(m.verify("correct horse", &d), Ok(()));
    }

    #[test]
    fn salt_round_trips_through_split() {
        let encoded = bcrypt_secret("pw", 4, ::bcrypt::Version::TwoB);
        let parts = split_hash(&encoded).expect("split");
        assert_eq!(parts.salt, SALT);
        assert_eq!(parts.cost, 4);
        assert_eq!(parts.hash.len(), HASH_CHARS);
    }

    #[test]
    fn cost_above_ceiling_is_rejected_without_hashing() {
        let m = BcryptMatcher::new(10);
        let mut encoded = bcrypt_secret("pw", 4, ::bcrypt::Version::TwoB);
        encoded.replace_range(4..6, "31");
        let d = SecretDescriptor::new("bcrypt", encoded);
        assert_eq!(
            m.validate(&d),
            Err(VerifyError::CostTooLarge {
                parameter: "bcrypt cost",
                value: 31,
                max: 10
            })
        );
    }

    #[test]
    fn structural_garbage_is_malformed() {
        let m = BcryptMatcher::new(10);
        let good = bcrypt_secret("pw", 4, ::bcrypt::Version::TwoB);

        let mut wrong_version = good.clone();
        wrong_version.replace_range(1..3, "3a");

        let mut low_cost = good.clone();
        low_cost.replace_range(4..6, "03");

        let mut bad_cost = good.clone();
        bad_cost.replace_range(4..6, "x1");

        let mut bad_alphabet = good.clone();
        bad_alphabet.replace_range(20..21, "+");

        for encoded in [
            "".to_string(),
            "$2b$04$".to_string(),
            good[..59].to_string(),
            format!("{good}A"),
            good.replacen('$', "#", 1),
            wrong_version,
            low_cost,
            bad_cost,
            bad_alphabet,
        ] {
            let d = SecretDescriptor::new("bcrypt", encoded.clone());
            assert!(
                matches!(m.validate(&d), Err(VerifyError::MalformedSecret { .. })),
                "expected malformed for {encoded:?}"
            );
        }
    }

    #[test]
    fn multibyte_input_is_rejected_without_panicking() {
        let m = BcryptMatcher::new(10);
        let encoded = format!("$2b$04${}", "é".repeat(26));
        assert_eq!(encoded.len(), 7 + 52);
        let d = SecretDescriptor::new("bcrypt", format!("{encoded}a"));
        assert!(m.validate(&d).is_err());
    }

    #[test]
    fn compare_is_constant_time() {
        reset_ct_eq_calls();
        let m = BcryptMatcher::new(10);
        let d = SecretDescriptor::new("bcrypt", bcrypt_secret("a", 4, ::bcrypt::Version::TwoA));
        assert_eq!(m.verify("b", &d), Err(VerifyError::Mismatch));
        assert!(
            ct_eq_call_count() >= 1,
            "expected constant-time compare helper to be invoked"
        );
    }
}
