//! SHA-256-crypt and SHA-512-crypt, the glibc `$5$`/`$6$` schemes.
//!
//! These are the traditional Unix crypt(3) formats. The salt is plain text
//! drawn from the crypt alphabet `./0-9A-Za-z` (at most 16 characters) and
//! the `rounds=N$` segment is omitted when the record uses the historical
//! default of 5000 rounds. The transform itself comes from the `sha-crypt`
//! crate and is bit-compatible with glibc.

mod record;

use sha_crypt::{Sha256Params, Sha512Params, sha256_crypt_b64, sha512_crypt_b64};

use crate::compare::secure_compare;
use crate::encoding;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::Sha2CryptRecord;

/// Rounds a record is assumed to use when it carries no `rounds=` segment.
pub const DEFAULT_ROUNDS: u32 = 5_000;
/// Smallest rounds value a record may specify.
pub const MIN_ROUNDS: u32 = 1_000;
/// Largest rounds value a record may specify.
pub const MAX_ROUNDS: u32 = 999_999_999;
/// Rounds used for newly issued hashes.
pub const RECOMMENDED_ROUNDS: u32 = 110_000;

const SALT_LEN: usize = 16;

/// Which member of the SHA-2-crypt family a scheme instance speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sha2Variant {
    /// SHA-256-crypt, records prefixed `$5$`.
    Sha256,
    /// SHA-512-crypt, records prefixed `$6$`.
    Sha512,
}

impl Sha2Variant {
    pub(crate) fn prefix_digit(self) -> u8 {
        match self {
            Sha2Variant::Sha256 => b'5',
            Sha2Variant::Sha512 => b'6',
        }
    }

    pub(crate) fn digest_len(self) -> usize {
        // Length of the crypt-base64 digest text.
        match self {
            Sha2Variant::Sha256 => 43,
            Sha2Variant::Sha512 => 86,
        }
    }
}

/// SHA-2-crypt scheme with a configured number of rounds for new hashes.
#[derive(Debug, Clone)]
pub struct Sha2Crypt {
    variant: Sha2Variant,
    rounds: u32,
}

impl Sha2Crypt {
    /// SHA-256-crypt with [`RECOMMENDED_ROUNDS`].
    pub fn sha256() -> Self {
        Self {
            variant: Sha2Variant::Sha256,
            rounds: RECOMMENDED_ROUNDS,
        }
    }

    /// SHA-512-crypt with [`RECOMMENDED_ROUNDS`].
    pub fn sha512() -> Self {
        Self {
            variant: Sha2Variant::Sha512,
            rounds: RECOMMENDED_ROUNDS,
        }
    }

    /// Creates a scheme with an explicit number of rounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `rounds` is outside [`MIN_ROUNDS`]..=[`MAX_ROUNDS`].
    pub fn new(variant: Sha2Variant, rounds: u32) -> Result<Self, InvalidParametersError> {
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
            return Err(InvalidParametersError {
                reason: format!(
                    "sha2-crypt rounds is {rounds} but must be in {MIN_ROUNDS}..={MAX_ROUNDS}"
                ),
            });
        }
        Ok(Self { variant, rounds })
    }

    fn fresh_record(&self) -> Result<Sha2CryptRecord, PasswordError> {
        // 12 random bytes encode to exactly 16 salt characters.
        let salt = encoding::encode(&encoding::CRYPT64, &random_bytes::<12>()?);
        Ok(Sha2CryptRecord {
            variant: self.variant,
            rounds: self.rounds,
            explicit_rounds: self.rounds != DEFAULT_ROUNDS,
            salt,
            digest: None,
        })
    }
}

fn compute_digest(
    variant: Sha2Variant,
    password: &str,
    salt: &str,
    rounds: u32,
) -> Result<String, PasswordError> {
    match variant {
        Sha2Variant::Sha256 => {
            let params = Sha256Params::new(rounds as usize).map_err(|err| {
                PasswordError::malformed(format!("sha256-crypt rejected rounds={rounds}: {err:?}"))
            })?;
            sha256_crypt_b64(password.as_bytes(), salt.as_bytes(), &params).map_err(|err| {
                PasswordError::malformed(format!("sha256-crypt transform failed: {err:?}"))
            })
        }
        Sha2Variant::Sha512 => {
            let params = Sha512Params::new(rounds as usize).map_err(|err| {
                PasswordError::malformed(format!("sha512-crypt rejected rounds={rounds}: {err:?}"))
            })?;
            sha512_crypt_b64(password.as_bytes(), salt.as_bytes(), &params).map_err(|err| {
                PasswordError::malformed(format!("sha512-crypt transform failed: {err:?}"))
            })
        }
    }
}

impl Scheme for Sha2Crypt {
    fn recognizes(&self, record: &str) -> bool {
        let bytes = record.as_bytes();
        bytes.len() >= 3
            && bytes[0] == b'$'
            && bytes[1] == self.variant.prefix_digit()
            && bytes[2] == b'$'
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        Ok(self.fresh_record()?.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = self.fresh_record()?;
        record.digest = Some(compute_digest(
            record.variant,
            password,
            &record.salt,
            record.rounds,
        )?);
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = Sha2CryptRecord::parse(record)?;
        if parsed.variant != self.variant {
            return Err(PasswordError::malformed(
                "record belongs to the other sha2-crypt variant",
            ));
        }
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        let computed = compute_digest(parsed.variant, password, &parsed.salt, parsed.rounds)?;
        if secure_compare(computed.as_bytes(), stored.as_bytes()) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match Sha2CryptRecord::parse(record) {
            Ok(parsed) => {
                parsed.variant == self.variant
                    && (parsed.rounds < self.rounds || parsed.salt.len() < SALT_LEN)
            }
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}
