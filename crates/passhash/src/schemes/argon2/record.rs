use std::fmt::Debug;

use crate::encoding;
use crate::errors::PasswordError;

/// Parsed form of a `$argon2i$v=V$m=M,t=T,p=P$salt[$hash]` record.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Argon2Record {
    pub(crate) version: u32,
    pub(crate) memory: u32,
    pub(crate) time: u32,
    pub(crate) threads: u32,
    pub(crate) salt: Vec<u8>,
    pub(crate) digest: Option<Vec<u8>>,
}

fn parse_pair<'a>(pair: &'a str, what: &str) -> Result<(&'a str, u32), PasswordError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| PasswordError::malformed(format!("{what} must be key=value pairs")))?;
    Ok((key, encoding::parse_decimal(value, what)?))
}

impl Argon2Record {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        let rest = record
            .strip_prefix("$argon2i$")
            .ok_or_else(|| PasswordError::malformed("argon2 record must start with $argon2i$"))?;

        let segments: Vec<&str> = rest.split('$').collect();
        let (version_segment, params_segment, salt, digest) = match segments.as_slice() {
            [version, params, salt] => (*version, *params, *salt, None),
            [version, params, salt, digest] => (*version, *params, *salt, Some(*digest)),
            _ => {
                return Err(PasswordError::malformed(
                    "argon2 record has the wrong number of fields",
                ));
            }
        };

        let version = match parse_pair(version_segment, "argon2 version segment")? {
            ("v", version) => version,
            _ => {
                return Err(PasswordError::malformed(
                    "argon2 version segment must be v=<version>",
                ));
            }
        };
        if version != 16 && version != 19 {
            return Err(PasswordError::malformed(format!(
                "unsupported argon2 version {version}"
            )));
        }

        // The m, t and p pairs may come in any order, but each key must
        // appear exactly once.
        let (mut memory, mut time, mut threads) = (None, None, None);
        let pairs: Vec<&str> = params_segment.split(',').collect();
        if pairs.len() != 3 {
            return Err(PasswordError::malformed(format!(
                "argon2 parameter segment must have 3 key=value pairs, got {}",
                pairs.len()
            )));
        }
        for pair in pairs {
            let (key, value) = parse_pair(pair, "argon2 parameter segment")?;
            let slot = match key {
                "m" => &mut memory,
                "t" => &mut time,
                "p" => &mut threads,
                _ => {
                    return Err(PasswordError::malformed(format!(
                        "unknown argon2 parameter {key:?}"
                    )));
                }
            };
            if slot.replace(value).is_some() {
                return Err(PasswordError::malformed(format!(
                    "argon2 parameter {key:?} appears more than once"
                )));
            }
        }
        let (memory, time, threads) = (
            memory.expect("all three slots are filled after the loop"),
            time.expect("all three slots are filled after the loop"),
            threads.expect("all three slots are filled after the loop"),
        );
        if memory < 8 {
            return Err(PasswordError::malformed(format!(
                "argon2 memory cost is {memory} KiB but must be at least 8"
            )));
        }
        if time == 0 {
            return Err(PasswordError::malformed(
                "argon2 time cost must be positive",
            ));
        }
        if threads == 0 || threads > 255 {
            return Err(PasswordError::malformed(format!(
                "argon2 parallelism is {threads} but must be in 1..=255"
            )));
        }

        let salt = encoding::decode(&encoding::STANDARD_NO_PAD, salt, "argon2 salt")?;
        if salt.len() < 8 {
            return Err(PasswordError::malformed(format!(
                "argon2 salt is {} bytes but must be at least 8",
                salt.len()
            )));
        }
        let digest = digest
            .map(|digest| encoding::decode(&encoding::STANDARD_NO_PAD, digest, "argon2 digest"))
            .transpose()?;
        if let Some(digest) = &digest {
            if digest.len() < 4 || digest.len() > 64 {
                return Err(PasswordError::malformed(format!(
                    "argon2 digest is {} bytes but must be in 4..=64",
                    digest.len()
                )));
            }
        }

        Ok(Self {
            version,
            memory,
            time,
            threads,
            salt,
            digest,
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!(
            "$argon2i$v={}$m={},t={},p={}${}",
            self.version,
            self.memory,
            self.time,
            self.threads,
            encoding::encode(&encoding::STANDARD_NO_PAD, &self.salt)
        );
        if let Some(digest) = &self.digest {
            out.push('$');
            out.push_str(&encoding::encode(&encoding::STANDARD_NO_PAD, digest));
        }
        out
    }
}

impl Debug for Argon2Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Record")
            .field("version", &self.version)
            .field("memory", &self.memory)
            .field("time", &self.time)
            .field("threads", &self.threads)
            .field("salt", &hex::encode(&self.salt))
            .field("digest", &self.digest.as_deref().map(hex::encode))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str =
        "$argon2i$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew$KlvqGCHX7Cap0ohKY7YAUJsbzcnenCwvSAfhqtIA/Q0";

    #[test]
    fn parse_complete_record() {
        let parsed = Argon2Record::parse(RECORD).unwrap();
        assert_eq!(parsed.version, 19);
        assert_eq!(parsed.memory, 32768);
        assert_eq!(parsed.time, 4);
        assert_eq!(parsed.threads, 4);
        assert_eq!(parsed.salt.len(), 16);
        assert_eq!(parsed.digest.as_ref().map(Vec::len), Some(32));
    }

    #[test]
    fn encode_reproduces_original_text() {
        let parsed = Argon2Record::parse(RECORD).unwrap();
        assert_eq!(parsed.encode(), RECORD);
    }

    #[test]
    fn parameters_parse_in_any_order() {
        let shuffled = "$argon2i$v=19$p=4,m=32768,t=4$uN6vgPBb8/liQld8lgFqew";
        let parsed = Argon2Record::parse(shuffled).unwrap();
        assert_eq!(parsed.memory, 32768);
        assert_eq!(parsed.time, 4);
        assert_eq!(parsed.threads, 4);
        // Encoding canonicalizes to m,t,p order.
        assert_eq!(
            parsed.encode(),
            "$argon2i$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew"
        );
    }

    #[test]
    fn prototype_roundtrip() {
        let prototype = "$argon2i$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew";
        let parsed = Argon2Record::parse(prototype).unwrap();
        assert_eq!(parsed.digest, None);
        assert_eq!(parsed.encode(), prototype);
    }

    #[test]
    fn rejects_other_argon2_families() {
        assert!(Argon2Record::parse("$argon2id$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
        assert!(Argon2Record::parse("$argon2d$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
    }

    #[test]
    fn rejects_unsupported_versions() {
        assert!(Argon2Record::parse("$argon2i$v=18$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
        assert!(Argon2Record::parse("$argon2i$x=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
    }

    #[test]
    fn rejects_missing_or_duplicate_parameters() {
        assert!(Argon2Record::parse("$argon2i$v=19$m=32768,t=4$uN6vgPBb8/liQld8lgFqew").is_err());
        assert!(
            Argon2Record::parse("$argon2i$v=19$m=32768,t=4,t=5$uN6vgPBb8/liQld8lgFqew").is_err()
        );
        assert!(
            Argon2Record::parse("$argon2i$v=19$m=32768,t=4,x=4$uN6vgPBb8/liQld8lgFqew").is_err()
        );
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        assert!(Argon2Record::parse("$argon2i$v=19$m=4,t=4,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
        assert!(Argon2Record::parse("$argon2i$v=19$m=32768,t=0,p=4$uN6vgPBb8/liQld8lgFqew").is_err());
        assert!(
            Argon2Record::parse("$argon2i$v=19$m=32768,t=4,p=256$uN6vgPBb8/liQld8lgFqew").is_err()
        );
    }

    #[test]
    fn rejects_padded_base64() {
        assert!(Argon2Record::parse("$argon2i$v=19$m=32768,t=4,p=4$uN6vgPBb8/liQld8lgFqew==").is_err());
    }

    #[test]
    fn rejects_short_salt() {
        assert!(Argon2Record::parse("$argon2i$v=19$m=32768,t=4,p=4$c2hvcnQ").is_err());
    }
}
