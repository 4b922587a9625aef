use subtle::ConstantTimeEq;

#[cfg(test)]
use std::cell::Cell;

#[cfg(test)]
thread_local! {
    static CT_EQ_CALLS: Cell<usize> = const { Cell::new(0) };
}

/// Constant-time byte slice equality.
///
/// Used for every computed-vs-stored hash comparison so the time taken does not depend on where
/// the first differing byte is. Slices of different length compare unequal; only the lengths
/// are observable.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    #[cfg(test)]
    CT_EQ_CALLS.with(|calls| calls.set(calls.get().saturating_add(1)));

    bool::from(a.ct_eq(b))
}

#[cfg(test)]
pub(crate) fn reset_ct_eq_calls() {
    CT_EQ_CALLS.with(|calls| calls.set(0));
}

#[cfg(test)]
pub(crate) fn ct_eq_call_count() -> usize {
    CT_EQ_CALLS.with(|calls| calls.get())
}

#[cfg(test)]
mod tests {
    use super::ct_eq;

    #[test]
    fn ct_eq_true_for_equal_slices() {
        assert!(ct_eq(b"", b""));
        assert!(ct_eq(b"abc", b"abc"));
        assert!(ct_eq(&[0u8, 1, 2, 3], &[0u8, 1, 2, 3]));
    }

    #[test]
    fn ct_eq_false_for_mismatched_slices() {
        assert!(!ct_eq(b"abc", b"xbc"));
        assert!(!ct_eq(b"abc", b"axc"));
        assert!(!ct_eq(b"abc", b"abx"));
    }

    #[test]
    fn ct_eq_false_for_different_lengths() {
        assert!(!ct_eq(b"a", b""));
        assert!(!ct_eq(b"ab", b"abc"));
    }

    #[test]
    fn digest_length_buffers_differing_in_any_single_bit() {
        let stored = [0xA5u8; 64];
        assert!(ct_eq(&stored, &[0xA5u8; 64]));
        for byte in [0, 31, 63] {
            for bit in 0..8 {
                let mut computed = stored;
                computed[byte] ^= 1 << bit;
                assert!(!ct_eq(&computed, &stored), "byte {byte} bit {bit}");
            }
        }
        // A SHA-256 digest never equals a SHA-512 digest sharing its prefix.
        assert!(!ct_eq(&stored[..32], &stored));
    }
}
