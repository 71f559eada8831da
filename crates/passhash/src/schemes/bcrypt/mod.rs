//! bcrypt password hashing, records prefixed `$2a$`, `$2b$` or `$2y$`.
//!
//! The record packs a 22-character salt and a 31-character digest into one
//! 53-character block with no separator, both in bcrypt's own radix-64
//! alphabet. New hashes are issued with the `2b` minor version; verification
//! accepts `2a`, `2b` and `2y`, which all compute the same digest. bcrypt
//! silently truncates passwords to 72 bytes; see
//! [`BcryptSha256`](super::BcryptSha256) for the wrapper that lifts that
//! limit.

mod record;

use crate::compare::secure_compare;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::BcryptRecord;

/// Cost factor used for newly issued hashes.
pub const RECOMMENDED_COST: u32 = 12;
/// Smallest cost factor a record may specify.
pub const MIN_COST: u32 = 4;
/// Largest cost factor a record may specify.
pub const MAX_COST: u32 = 31;

pub(crate) const SALT_LEN: usize = 16;

/// Minor version letter of a bcrypt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcryptVariant {
    /// The `2a` revision.
    TwoA,
    /// The `2b` revision, used for newly issued hashes.
    TwoB,
    /// The `2y` revision, emitted by crypt_blowfish.
    TwoY,
}

impl BcryptVariant {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BcryptVariant::TwoA => "2a",
            BcryptVariant::TwoB => "2b",
            BcryptVariant::TwoY => "2y",
        }
    }

    pub(crate) fn from_str(value: &str) -> Option<Self> {
        match value {
            "2a" => Some(BcryptVariant::TwoA),
            "2b" => Some(BcryptVariant::TwoB),
            "2y" => Some(BcryptVariant::TwoY),
            _ => None,
        }
    }
}

/// bcrypt scheme with a configured cost factor for new hashes.
#[derive(Debug, Clone)]
pub struct Bcrypt {
    cost: u32,
}

impl Bcrypt {
    /// bcrypt with [`RECOMMENDED_COST`].
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

/// Runs the bcrypt transform and returns the 31-character digest text.
pub(crate) fn compute_digest(
    password: &[u8],
    cost: u32,
    salt: [u8; SALT_LEN],
) -> Result<String, PasswordError> {
    let parts = bcrypt::hash_with_salt(password, cost, salt).map_err(|err| {
        PasswordError::malformed(format!("bcrypt transform rejected the input: {err}"))
    })?;
    // `HashParts` exposes no accessor for the digest alone; reconstruct the
    // full `$2b$cc$<salt22><digest31>` text and take the trailing 31 chars.
    let formatted = parts.format_for_version(bcrypt::Version::TwoB);
    let digest = formatted
        .get(formatted.len() - 31..)
        .expect("bcrypt output always ends with a 31-character digest")
        .to_owned();
    Ok(digest)
}

impl Scheme for Bcrypt {
    fn recognizes(&self, record: &str) -> bool {
        let bytes = record.as_bytes();
        bytes.len() >= 3
            && bytes[0] == b'$'
            && bytes[1] == b'2'
            && (bytes[2] == b'$'
                || (bytes.len() >= 4
                    && bytes[3] == b'$'
                    && matches!(bytes[2], b'a' | b'b' | b'y')))
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        let record = BcryptRecord {
            variant: BcryptVariant::TwoB,
            cost: self.cost,
            salt: random_bytes::<SALT_LEN>()?,
            digest: None,
        };
        Ok(record.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = BcryptRecord {
            variant: BcryptVariant::TwoB,
            cost: self.cost,
            salt: random_bytes::<SALT_LEN>()?,
            digest: None,
        };
        record.digest = Some(compute_digest(
            password.as_bytes(),
            record.cost,
            record.salt,
        )?);
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = BcryptRecord::parse(record)?;
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        let computed = compute_digest(password.as_bytes(), parsed.cost, parsed.salt)?;
        if secure_compare(computed.as_bytes(), stored.as_bytes()) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match BcryptRecord::parse(record) {
            Ok(parsed) => parsed.cost < self.cost,
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests;
