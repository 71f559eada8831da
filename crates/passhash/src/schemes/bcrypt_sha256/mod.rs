//! bcrypt over a SHA-256 pre-hash, records prefixed `$bcrypt-sha256$`.
//!
//! bcrypt only looks at the first 72 bytes of a password. This scheme first
//! hashes the password with SHA-256 and base64-encodes the digest, so that
//! passwords of any length feed bcrypt a fixed-size, high-entropy input. The
//! record layout is `$bcrypt-sha256$<minor>,<cost>$<salt22>$<digest31>`, with
//! salt and digest in bcrypt's radix-64 alphabet.

// TODO Support the newer `$bcrypt-sha256$v=2,t=2b,r=<cost>$` layout, which
// switches the pre-hash to HMAC-SHA-256 keyed with the salt.

mod record;

use sha2::{Digest as _, Sha256};

use crate::compare::secure_compare;
use crate::encoding;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::BcryptSha256Record;

use super::bcrypt::{BcryptVariant, MAX_COST, MIN_COST, RECOMMENDED_COST, SALT_LEN, compute_digest};

/// bcrypt-sha256 scheme with a configured cost factor for new hashes.
#[derive(Debug, Clone)]
pub struct BcryptSha256 {
    cost: u32,
}

impl BcryptSha256 {
    /// bcrypt-sha256 with the recommended bcrypt cost factor.
    pub fn recommended() -> Self {
        Self {
            cost: RECOMMENDED_COST,
        }
    }

    /// Creates a scheme with an explicit cost factor.
    ///
    /// # Errors
    ///
    /// Returns an error if `cost` is outside [`MIN_COST`]..=[`MAX_COST`].
    pub fn new(cost: u32) -> Result<Self, InvalidParametersError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(InvalidParametersError {
                reason: format!("bcrypt cost is {cost} but must be in {MIN_COST}..={MAX_COST}"),
            });
        }
        Ok(Self { cost })
    }
}

/// The bcrypt input derived from the password: base64 of its SHA-256 digest.
fn prehash(password: &str) -> String {
    encoding::encode(&encoding::STANDARD, &Sha256::digest(password.as_bytes()))
}

impl Scheme for BcryptSha256 {
    fn recognizes(&self, record: &str) -> bool {
        record.starts_with("$bcrypt-sha256$")
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        let record = BcryptSha256Record {
            variant: BcryptVariant::TwoA,
            cost: self.cost,
            salt: random_bytes::<SALT_LEN>()?,
            digest: None,
        };
        Ok(record.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = BcryptSha256Record {
            variant: BcryptVariant::TwoA,
            cost: self.cost,
            salt: random_bytes::<SALT_LEN>()?,
            digest: None,
        };
        record.digest = Some(compute_digest(
            prehash(password).as_bytes(),
            record.cost,
            record.salt,
        )?);
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = BcryptSha256Record::parse(record)?;
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        let computed = compute_digest(prehash(password).as_bytes(), parsed.cost, parsed.salt)?;
        if secure_compare(computed.as_bytes(), stored.as_bytes()) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match BcryptSha256Record::parse(record) {
            Ok(parsed) => parsed.cost < self.cost,
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}
