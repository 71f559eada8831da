use subtle::ConstantTimeEq;

/// Compares two byte sequences in constant time.
///
/// When the lengths are equal, every byte of both operands is examined and a
/// bitwise difference is accumulated; equality is decided only after the full
/// scan, so the comparison time does not depend on where the first mismatch
/// occurs. Inputs of unequal length return `false` immediately: digest length
/// is a public parameter of each scheme, not a secret.
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs() {
        assert!(secure_compare(b"", b""));
        assert!(secure_compare(b"a", b"a"));
        assert!(secure_compare(b"some longer input", b"some longer input"));
    }

    #[test]
    fn difference_at_first_byte() {
        assert!(!secure_compare(b"Xbcdefgh", b"abcdefgh"));
    }

    #[test]
    fn difference_at_last_byte() {
        assert!(!secure_compare(b"abcdefgX", b"abcdefgh"));
    }

    #[test]
    fn unequal_lengths() {
        assert!(!secure_compare(b"abc", b"abcd"));
        assert!(!secure_compare(b"abcd", b"abc"));
        assert!(!secure_compare(b"", b"a"));
    }
}
