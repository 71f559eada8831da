use std::fmt::Debug;

use crate::encoding;
use crate::errors::PasswordError;

use super::DIGEST_LEN;

/// Parsed form of a `$s2$N$r$p$salt[$hash]` record.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ScryptRecord {
    pub(crate) n: u32,
    pub(crate) r: u32,
    pub(crate) p: u32,
    pub(crate) salt: Vec<u8>,
    pub(crate) digest: Option<Vec<u8>>,
}

impl ScryptRecord {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        let rest = record
            .strip_prefix("$s2$")
            .ok_or_else(|| PasswordError::malformed("scrypt record must start with $s2$"))?;

        let segments: Vec<&str> = rest.split('$').collect();
        let (n, r, p, salt, digest) = match segments.as_slice() {
            [n, r, p, salt] => (*n, *r, *p, *salt, None),
            [n, r, p, salt, digest] => (*n, *r, *p, *salt, Some(*digest)),
            _ => {
                return Err(PasswordError::malformed(
                    "scrypt record has the wrong number of fields",
                ));
            }
        };

        let n = encoding::parse_decimal(n, "scrypt parameter n")?;
        let r = encoding::parse_decimal(r, "scrypt parameter r")?;
        let p = encoding::parse_decimal(p, "scrypt parameter p")?;
        if n < 2 || !n.is_power_of_two() {
            return Err(PasswordError::malformed(format!(
                "scrypt parameter n={n} must be a power of 2 and at least 2"
            )));
        }
        if r == 0 || p == 0 {
            return Err(PasswordError::malformed(
                "scrypt parameters r and p must be positive",
            ));
        }

        let salt = encoding::decode(&encoding::STANDARD, salt, "scrypt salt")?;
        let digest = digest
            .map(|digest| encoding::decode(&encoding::STANDARD, digest, "scrypt digest"))
            .transpose()?;
        if let Some(digest) = &digest {
            if digest.len() != DIGEST_LEN {
                return Err(PasswordError::malformed(format!(
                    "scrypt digest must be {DIGEST_LEN} bytes, got {}",
                    digest.len()
                )));
            }
        }

        Ok(Self {
            n,
            r,
            p,
            salt,
            digest,
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!(
            "$s2${}${}${}${}",
            self.n,
            self.r,
            self.p,
            encoding::encode(&encoding::STANDARD, &self.salt)
        );
        if let Some(digest) = &self.digest {
            out.push('$');
            out.push_str(&encoding::encode(&encoding::STANDARD, digest));
        }
        out
    }
}

impl Debug for ScryptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScryptRecord")
            .field("n", &self.n)
            .field("r", &self.r)
            .field("p", &self.p)
            .field("salt", &hex::encode(&self.salt))
            .field("digest", &self.digest.as_deref().map(hex::encode))
            .finish()
    }
}
