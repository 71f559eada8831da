//! PBKDF2-HMAC password hashing, records prefixed `$pbkdf2$`,
//! `$pbkdf2-sha256$` or `$pbkdf2-sha512$`.
//!
//! The bare `$pbkdf2$` identifier implies HMAC-SHA-1. Salt and digest are
//! encoded in adapted base64 (see [`crate::encoding`]); the digest length
//! always equals the underlying hash's output size.

mod record;

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::compare::secure_compare;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::Pbkdf2Record;

/// Rounds used for newly issued HMAC-SHA-1 hashes.
pub const RECOMMENDED_ROUNDS_SHA1: u32 = 131_000;
/// Rounds used for newly issued HMAC-SHA-256 hashes.
pub const RECOMMENDED_ROUNDS_SHA256: u32 = 29_000;
/// Rounds used for newly issued HMAC-SHA-512 hashes.
pub const RECOMMENDED_ROUNDS_SHA512: u32 = 25_000;

const SALT_LEN: usize = 16;

/// Which HMAC a PBKDF2 scheme instance uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbkdf2Variant {
    /// HMAC-SHA-1, records prefixed `$pbkdf2$`.
    Sha1,
    /// HMAC-SHA-256, records prefixed `$pbkdf2-sha256$`.
    Sha256,
    /// HMAC-SHA-512, records prefixed `$pbkdf2-sha512$`.
    Sha512,
}

impl Pbkdf2Variant {
    pub(crate) fn ident(self) -> &'static str {
        match self {
            Pbkdf2Variant::Sha1 => "$pbkdf2$",
            Pbkdf2Variant::Sha256 => "$pbkdf2-sha256$",
            Pbkdf2Variant::Sha512 => "$pbkdf2-sha512$",
        }
    }

    pub(crate) fn digest_len(self) -> usize {
        match self {
            Pbkdf2Variant::Sha1 => 20,
            Pbkdf2Variant::Sha256 => 32,
            Pbkdf2Variant::Sha512 => 64,
        }
    }
}

/// PBKDF2 scheme with a configured number of rounds for new hashes.
#[derive(Debug, Clone)]
pub struct Pbkdf2 {
    variant: Pbkdf2Variant,
    rounds: u32,
}

impl Pbkdf2 {
    /// PBKDF2-HMAC-SHA-1 with [`RECOMMENDED_ROUNDS_SHA1`].
    pub fn sha1() -> Self {
        Self {
            variant: Pbkdf2Variant::Sha1,
            rounds: RECOMMENDED_ROUNDS_SHA1,
        }
    }

    /// PBKDF2-HMAC-SHA-256 with [`RECOMMENDED_ROUNDS_SHA256`].
    pub fn sha256() -> Self {
        Self {
            variant: Pbkdf2Variant::Sha256,
            rounds: RECOMMENDED_ROUNDS_SHA256,
        }
    }

    /// PBKDF2-HMAC-SHA-512 with [`RECOMMENDED_ROUNDS_SHA512`].
    pub fn sha512() -> Self {
        Self {
            variant: Pbkdf2Variant::Sha512,
            rounds: RECOMMENDED_ROUNDS_SHA512,
        }
    }

    /// Creates a scheme with an explicit number of rounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `rounds` is zero.
    pub fn new(variant: Pbkdf2Variant, rounds: u32) -> Result<Self, InvalidParametersError> {
        if rounds == 0 {
            return Err(InvalidParametersError {
                reason: "pbkdf2 rounds must be positive".to_owned(),
            });
        }
        Ok(Self { variant, rounds })
    }
}

fn compute_digest(variant: Pbkdf2Variant, password: &str, salt: &[u8], rounds: u32) -> Vec<u8> {
    let mut digest = vec![0; variant.digest_len()];
    match variant {
        Pbkdf2Variant::Sha1 => pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, rounds, &mut digest),
        Pbkdf2Variant::Sha256 => {
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut digest)
        }
        Pbkdf2Variant::Sha512 => {
            pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, rounds, &mut digest)
        }
    }
    digest
}

impl Scheme for Pbkdf2 {
    fn recognizes(&self, record: &str) -> bool {
        // The trailing `$` of the identifier keeps `$pbkdf2$` from matching
        // the suffixed variants.
        record.starts_with(self.variant.ident())
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        let record = Pbkdf2Record {
            variant: self.variant,
            rounds: self.rounds,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        Ok(record.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = Pbkdf2Record {
            variant: self.variant,
            rounds: self.rounds,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        record.digest = Some(compute_digest(
            record.variant,
            password,
            &record.salt,
            record.rounds,
        ));
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = Pbkdf2Record::parse(record)?;
        if parsed.variant != self.variant {
            return Err(PasswordError::malformed(
                "record belongs to a different pbkdf2 variant",
            ));
        }
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        let computed = compute_digest(parsed.variant, password, &parsed.salt, parsed.rounds);
        if secure_compare(&computed, stored) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match Pbkdf2Record::parse(record) {
            Ok(parsed) => {
                parsed.variant == self.variant
                    && (parsed.rounds < self.rounds || parsed.salt.len() < SALT_LEN)
            }
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}
