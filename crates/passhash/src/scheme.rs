use std::fmt::Debug;

use derive_more::{Display, Error};
use rand::TryRngCore as _;

use crate::errors::PasswordError;

/// A password hashing scheme: one modular-crypt-format family bound to its
/// key derivation function.
///
/// A scheme's identity and configured parameters are immutable after
/// construction; to change the cost of new hashes, construct a new scheme.
/// Schemes are cheap, stateless values that are safe to share across threads.
pub trait Scheme: Debug + Send + Sync {
    /// Returns whether this scheme is responsible for the given record.
    ///
    /// This matches only the fixed format prefix and never requires a full
    /// parse: a record that is recognized but malformed must be rejected with
    /// [`PasswordError::MalformedRecord`] by the other operations, not
    /// silently passed over to another scheme.
    fn recognizes(&self, record: &str) -> bool;

    /// Generates a prototype record: algorithm identity, this scheme's
    /// configured parameters and a fresh random salt, but no digest yet.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::RandomSource`] if the system random source
    /// fails.
    fn make_prototype(&self) -> Result<String, PasswordError>;

    /// Hashes a password into a complete record, using a fresh random salt
    /// and this scheme's configured parameters.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Verifies a password against a previously stored record.
    ///
    /// The digest is recomputed with the salt and parameters stored in the
    /// record itself and compared in constant time. A digest mismatch, or a
    /// prototype record without a digest segment, is
    /// [`PasswordError::InvalidPassword`].
    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError>;

    /// Returns whether the record's parameters are weaker than this scheme's
    /// configured ones and the password should be re-hashed on next
    /// verification.
    ///
    /// This check is advisory and fails open: a record that cannot be parsed
    /// returns `false` rather than an error.
    fn needs_upgrade(&self, record: &str) -> bool;
}

/// A scheme was constructed with parameters outside their valid range.
#[derive(Error, Display, Debug)]
#[display("scheme parameter out of range: {reason}")]
pub struct InvalidParametersError {
    /// Which parameter was out of range, and why.
    pub reason: String,
}

/// Draws `N` bytes from the operating system's random source.
///
/// Salts must never repeat, so this always goes to the OS CSPRNG; a failure
/// surfaces as [`PasswordError::RandomSource`].
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N], PasswordError> {
    let mut buf = [0; N];
    rand::rngs::OsRng.try_fill_bytes(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_differ_between_calls() {
        let a = random_bytes::<16>().unwrap();
        let b = random_bytes::<16>().unwrap();
        assert_ne!(a, b);
    }
}
