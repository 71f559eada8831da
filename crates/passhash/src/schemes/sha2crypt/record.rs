use crate::encoding;
use crate::errors::PasswordError;

use super::{DEFAULT_ROUNDS, MAX_ROUNDS, MIN_ROUNDS, Sha2Variant};

/// Parsed form of a `$5$`/`$6$` record.
///
/// `explicit_rounds` remembers whether the original text spelled out a
/// `rounds=` segment, so that re-encoding reproduces the record byte for
/// byte even when the spelled-out value equals the historical default.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Sha2CryptRecord {
    pub(crate) variant: Sha2Variant,
    pub(crate) rounds: u32,
    pub(crate) explicit_rounds: bool,
    pub(crate) salt: String,
    pub(crate) digest: Option<String>,
}

fn is_crypt64(byte: u8) -> bool {
    matches!(byte, b'.' | b'/' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

impl Sha2CryptRecord {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        let bytes = record.as_bytes();
        if bytes.len() < 3 || bytes[0] != b'$' || bytes[2] != b'$' {
            return Err(PasswordError::malformed(
                "sha2-crypt record must start with $5$ or $6$",
            ));
        }
        let variant = match bytes[1] {
            b'5' => Sha2Variant::Sha256,
            b'6' => Sha2Variant::Sha512,
            _ => {
                return Err(PasswordError::malformed(
                    "sha2-crypt record must start with $5$ or $6$",
                ));
            }
        };

        let segments: Vec<&str> = record[3..].split('$').collect();
        let (rounds, explicit_rounds, rest) = match segments.split_first() {
            Some((first, rest)) if first.starts_with("rounds=") => {
                let value = &first["rounds=".len()..];
                let rounds = encoding::parse_decimal(value, "sha2-crypt rounds")?;
                if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
                    return Err(PasswordError::malformed(format!(
                        "sha2-crypt rounds is {rounds} but must be in {MIN_ROUNDS}..={MAX_ROUNDS}"
                    )));
                }
                (rounds, true, rest)
            }
            _ => (DEFAULT_ROUNDS, false, &segments[..]),
        };

        let (salt, digest) = match rest {
            [salt] => (*salt, None),
            [salt, digest] => (*salt, Some(*digest)),
            _ => {
                return Err(PasswordError::malformed(
                    "sha2-crypt record has the wrong number of fields",
                ));
            }
        };

        if salt.len() > 16 || !salt.bytes().all(is_crypt64) {
            return Err(PasswordError::malformed(format!(
                "sha2-crypt salt must be at most 16 characters of ./0-9A-Za-z, got {salt:?}"
            )));
        }
        if let Some(digest) = digest {
            if digest.len() != variant.digest_len() || !digest.bytes().all(is_crypt64) {
                return Err(PasswordError::malformed(format!(
                    "sha2-crypt digest must be {} crypt-base64 characters",
                    variant.digest_len()
                )));
            }
        }

        Ok(Self {
            variant,
            rounds,
            explicit_rounds,
            salt: salt.to_owned(),
            digest: digest.map(str::to_owned),
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!("${}$", self.variant.prefix_digit() as char);
        if self.explicit_rounds {
            out.push_str(&format!("rounds={}$", self.rounds));
        }
        out.push_str(&self.salt);
        if let Some(digest) = &self.digest {
            out.push('$');
            out.push_str(digest);
        }
        out
    }
}
