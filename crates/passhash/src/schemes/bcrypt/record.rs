use std::fmt::Debug;

use crate::encoding;
use crate::errors::PasswordError;

use super::{BcryptVariant, MAX_COST, MIN_COST, SALT_LEN};

/// Parsed form of a `$2{a,b,y}$cost$<salt22><digest31>` record.
///
/// The minor version letter is preserved so that re-encoding reproduces the
/// record byte for byte; `2a`, `2b` and `2y` records all verify with the
/// same transform.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BcryptRecord {
    pub(crate) variant: BcryptVariant,
    pub(crate) cost: u32,
    pub(crate) salt: [u8; SALT_LEN],
    pub(crate) digest: Option<String>,
}

fn is_bcrypt64(byte: u8) -> bool {
    matches!(byte, b'.' | b'/' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

impl BcryptRecord {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        let rest = record
            .strip_prefix("$2")
            .ok_or_else(|| PasswordError::malformed("bcrypt record must start with $2"))?;
        // Legacy `$2$` records predate the minor version letter and are not
        // produced by anything this library needs to stay compatible with.
        let (variant, rest) = rest
            .split_once('$')
            .and_then(|(minor, rest)| {
                BcryptVariant::from_str(&format!("2{minor}")).map(|variant| (variant, rest))
            })
            .ok_or_else(|| {
                PasswordError::malformed("bcrypt record must use minor version 2a, 2b or 2y")
            })?;

        let (cost, block) = rest.split_once('$').ok_or_else(|| {
            PasswordError::malformed("bcrypt record is missing the salt+digest block")
        })?;
        if cost.len() != 2 || !cost.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(PasswordError::malformed(format!(
                "bcrypt cost must be two zero-padded decimal digits, got {cost:?}"
            )));
        }
        let cost: u32 = cost
            .parse()
            .expect("two ascii digits always parse as u32");
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordError::malformed(format!(
                "bcrypt cost is {cost} but must be in {MIN_COST}..={MAX_COST}"
            )));
        }

        if !block.bytes().all(is_bcrypt64) {
            return Err(PasswordError::malformed(
                "bcrypt salt+digest block contains characters outside ./A-Za-z0-9",
            ));
        }
        let (salt_text, digest) = match block.len() {
            22 => (block, None),
            53 => (&block[..22], Some(block[22..].to_owned())),
            len => {
                return Err(PasswordError::malformed(format!(
                    "bcrypt salt+digest block must be 22 or 53 characters, got {len}"
                )));
            }
        };
        let salt_bytes = encoding::decode(&encoding::BCRYPT64, salt_text, "bcrypt salt")?;
        let salt: [u8; SALT_LEN] = salt_bytes
            .try_into()
            .map_err(|_| PasswordError::malformed("bcrypt salt must decode to 16 bytes"))?;

        Ok(Self {
            variant,
            cost,
            salt,
            digest,
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!(
            "${}${:02}${}",
            self.variant.as_str(),
            self.cost,
            encoding::encode(&encoding::BCRYPT64, &self.salt)
        );
        if let Some(digest) = &self.digest {
            out.push_str(digest);
        }
        out
    }
}

impl Debug for BcryptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcryptRecord")
            .field("variant", &self.variant)
            .field("cost", &self.cost)
            .field("salt", &hex::encode(self.salt))
            .field("digest", &self.digest)
            .finish()
    }
}
