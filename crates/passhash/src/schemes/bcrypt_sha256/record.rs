use std::fmt::Debug;

use crate::encoding;
use crate::errors::PasswordError;

use super::super::bcrypt::{BcryptVariant, MAX_COST, MIN_COST, SALT_LEN};

/// Parsed form of a `$bcrypt-sha256$<minor>,<cost>$<salt22>[$<digest31>]`
/// record. Unlike plain bcrypt, the cost is plain decimal and salt and digest
/// are separated by `$`.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BcryptSha256Record {
    pub(crate) variant: BcryptVariant,
    pub(crate) cost: u32,
    pub(crate) salt: [u8; SALT_LEN],
    pub(crate) digest: Option<String>,
}

fn is_bcrypt64(byte: u8) -> bool {
    matches!(byte, b'.' | b'/' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

impl BcryptSha256Record {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        let rest = record.strip_prefix("$bcrypt-sha256$").ok_or_else(|| {
            PasswordError::malformed("bcrypt-sha256 record must start with $bcrypt-sha256$")
        })?;

        let segments: Vec<&str> = rest.split('$').collect();
        let (head, salt_text, digest) = match segments.as_slice() {
            [head, salt] => (*head, *salt, None),
            [head, salt, digest] => (*head, *salt, Some(*digest)),
            _ => {
                return Err(PasswordError::malformed(
                    "bcrypt-sha256 record has the wrong number of fields",
                ));
            }
        };

        let (minor, cost) = head.split_once(',').ok_or_else(|| {
            PasswordError::malformed("bcrypt-sha256 record must spell the version as <minor>,<cost>")
        })?;
        let variant = BcryptVariant::from_str(minor).ok_or_else(|| {
            PasswordError::malformed("bcrypt-sha256 record must use minor version 2a, 2b or 2y")
        })?;
        let cost = encoding::parse_decimal(cost, "bcrypt-sha256 cost")?;
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::malformed(format!(
                "bcrypt-sha256 cost is {cost} but must be in {MIN_COST}..={MAX_COST}"
            )));
        }

        if salt_text.len() != 22 || !salt_text.bytes().all(is_bcrypt64) {
            return Err(PasswordError::malformed(
                "bcrypt-sha256 salt must be 22 characters of ./A-Za-z0-9",
            ));
        }
        let salt_bytes = encoding::decode(&encoding::BCRYPT64, salt_text, "bcrypt-sha256 salt")?;
        let salt: [u8; SALT_LEN] = salt_bytes
            .try_into()
            .map_err(|_| PasswordError::malformed("bcrypt-sha256 salt must decode to 16 bytes"))?;

        if let Some(digest) = digest {
            if digest.len() != 31 || !digest.bytes().all(is_bcrypt64) {
                return Err(PasswordError::malformed(
                    "bcrypt-sha256 digest must be 31 characters of ./A-Za-z0-9",
                ));
            }
        }

        Ok(Self {
            variant,
            cost,
            salt,
            digest: digest.map(str::to_owned),
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!(
            "$bcrypt-sha256${},{}${}",
            self.variant.as_str(),
            self.cost,
            encoding::encode(&encoding::BCRYPT64, &self.salt)
        );
        if let Some(digest) = &self.digest {
            out.push('$');
            out.push_str(digest);
        }
        out
    }
}

impl Debug for BcryptSha256Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcryptSha256Record")
            .field("variant", &self.variant)
            .field("cost", &self.cost)
            .field("salt", &hex::encode(self.salt))
            .field("digest", &self.digest)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "$bcrypt-sha256$2a,12$LrmaIX5x4TRtAwEfwJZa1.$2ehnw6LvuIUTM0iz4iz9hNJZdVkBn3y";

    #[test]
    fn parse_complete_record() {
        let parsed = BcryptSha256Record::parse(RECORD).unwrap();
        assert_eq!(parsed.variant, BcryptVariant::TwoA);
        assert_eq!(parsed.cost, 12);
        assert_eq!(
            parsed.digest.as_deref(),
            Some("2ehnw6LvuIUTM0iz4iz9hNJZdVkBn3y")
        );
    }

    #[test]
    fn encode_reproduces_original_text() {
        let parsed = BcryptSha256Record::parse(RECORD).unwrap();
        assert_eq!(parsed.encode(), RECORD);
    }

    #[test]
    fn prototype_roundtrip() {
        let prototype = "$bcrypt-sha256$2b,4$LrmaIX5x4TRtAwEfwJZa1.";
        let parsed = BcryptSha256Record::parse(prototype).unwrap();
        assert_eq!(parsed.digest, None);
        assert_eq!(parsed.encode(), prototype);
    }

    #[test]
    fn rejects_missing_comma() {
        assert!(BcryptSha256Record::parse("$bcrypt-sha256$2a$LrmaIX5x4TRtAwEfwJZa1.").is_err());
    }

    #[test]
    fn rejects_unknown_minor_versions() {
        assert!(
            BcryptSha256Record::parse("$bcrypt-sha256$2x,12$LrmaIX5x4TRtAwEfwJZa1.").is_err()
        );
    }

    #[test]
    fn rejects_zero_padded_cost() {
        // The cost is plain decimal here, unlike in plain bcrypt records.
        assert!(
            BcryptSha256Record::parse("$bcrypt-sha256$2a,05$LrmaIX5x4TRtAwEfwJZa1.").is_err()
        );
    }

    #[test]
    fn rejects_out_of_range_cost() {
        assert!(BcryptSha256Record::parse("$bcrypt-sha256$2a,3$LrmaIX5x4TRtAwEfwJZa1.").is_err());
        assert!(
            BcryptSha256Record::parse("$bcrypt-sha256$2a,32$LrmaIX5x4TRtAwEfwJZa1.").is_err()
        );
    }

    #[test]
    fn rejects_wrong_salt_length() {
        assert!(BcryptSha256Record::parse("$bcrypt-sha256$2a,12$LrmaIX5x4TRtAwEfwJZa1").is_err());
    }

    #[test]
    fn rejects_wrong_digest_length() {
        assert!(
            BcryptSha256Record::parse("$bcrypt-sha256$2a,12$LrmaIX5x4TRtAwEfwJZa1.$2ehnw6")
                .is_err()
        );
    }
}
