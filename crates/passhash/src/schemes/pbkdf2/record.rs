use std::fmt::Debug;

use crate::encoding;
use crate::errors::PasswordError;

use super::Pbkdf2Variant;

/// Parsed form of a `$pbkdf2[-sha256|-sha512]$rounds$salt[$hash]` record.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Pbkdf2Record {
    pub(crate) variant: Pbkdf2Variant,
    pub(crate) rounds: u32,
    pub(crate) salt: Vec<u8>,
    pub(crate) digest: Option<Vec<u8>>,
}

impl Pbkdf2Record {
    pub(crate) fn parse(record: &str) -> Result<Self, PasswordError> {
        // Try the suffixed identifiers first; the bare `$pbkdf2$` identifier
        // ends in `$` so there is no overlap either way.
        let (variant, rest) = [
            Pbkdf2Variant::Sha256,
            Pbkdf2Variant::Sha512,
            Pbkdf2Variant::Sha1,
        ]
        .into_iter()
        .find_map(|variant| {
            record
                .strip_prefix(variant.ident())
                .map(|rest| (variant, rest))
        })
        .ok_or_else(|| PasswordError::malformed("pbkdf2 record has an unknown identifier"))?;

        let segments: Vec<&str> = rest.split('$').collect();
        let (rounds, salt, digest) = match segments.as_slice() {
            [rounds, salt] => (*rounds, *salt, None),
            [rounds, salt, digest] => (*rounds, *salt, Some(*digest)),
            _ => {
                return Err(PasswordError::malformed(
                    "pbkdf2 record has the wrong number of fields",
                ));
            }
        };

        let rounds = encoding::parse_decimal(rounds, "pbkdf2 rounds")?;
        if rounds == 0 {
            return Err(PasswordError::malformed("pbkdf2 rounds must be positive"));
        }

        let salt = encoding::decode(&encoding::AB64, salt, "pbkdf2 salt")?;
        if salt.is_empty() {
            return Err(PasswordError::malformed("pbkdf2 salt must not be empty"));
        }
        let digest = digest
            .map(|digest| encoding::decode(&encoding::AB64, digest, "pbkdf2 digest"))
            .transpose()?;
        if let Some(digest) = &digest {
            if digest.len() != variant.digest_len() {
                return Err(PasswordError::malformed(format!(
                    "pbkdf2 digest must be {} bytes, got {}",
                    variant.digest_len(),
                    digest.len()
                )));
            }
        }

        Ok(Self {
            variant,
            rounds,
            salt,
            digest,
        })
    }

    pub(crate) fn encode(&self) -> String {
        let mut out = format!(
            "{}{}${}",
            self.variant.ident(),
            self.rounds,
            encoding::encode(&encoding::AB64, &self.salt)
        );
        if let Some(digest) = &self.digest {
            out.push('$');
            out.push_str(&encoding::encode(&encoding::AB64, digest));
        }
        out
    }
}

impl Debug for Pbkdf2Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pbkdf2Record")
            .field("variant", &self.variant)
            .field("rounds", &self.rounds)
            .field("salt", &hex::encode(&self.salt))
            .field("digest", &self.digest.as_deref().map(hex::encode))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1_RECORD: &str = "$pbkdf2$131000$rpVyDoFwDoHwfi8FAGBMqQ$KzxgTFYx.WC8y3G7T.ZRNC16BDs";
    const SHA256_RECORD: &str =
        "$pbkdf2-sha256$29000$FeKc8773HmOMcW7tHUPo/Q$Xc31n0kWSaQd7xXJkR0O5W7vHXVCLfKNdKsgiBW.aYc";
    const SHA512_RECORD: &str = "$pbkdf2-sha512$25000$Rug9hxCCEAJAqBXCeO99rw$Z5cLeLLbcEHdv.LQzFi86iEVtMDdkKD8eI1b4JynptuWazoGEi/dkOmbD0211BXiKMlMPDBaDjqbp2xAelpSAQ";

    #[test]
    fn parse_identifies_the_variant() {
        assert_eq!(
            Pbkdf2Record::parse(SHA1_RECORD).unwrap().variant,
            Pbkdf2Variant::Sha1
        );
        assert_eq!(
            Pbkdf2Record::parse(SHA256_RECORD).unwrap().variant,
            Pbkdf2Variant::Sha256
        );
        assert_eq!(
            Pbkdf2Record::parse(SHA512_RECORD).unwrap().variant,
            Pbkdf2Variant::Sha512
        );
    }

    #[test]
    fn parse_complete_record() {
        let parsed = Pbkdf2Record::parse(SHA1_RECORD).unwrap();
        assert_eq!(parsed.rounds, 131_000);
        assert_eq!(parsed.salt.len(), 16);
        assert_eq!(parsed.digest.as_ref().map(Vec::len), Some(20));
    }

    #[test]
    fn encode_reproduces_original_text() {
        for record in [SHA1_RECORD, SHA256_RECORD, SHA512_RECORD] {
            let parsed = Pbkdf2Record::parse(record).unwrap();
            assert_eq!(parsed.encode(), record);
        }
    }

    #[test]
    fn prototype_roundtrip() {
        let prototype = "$pbkdf2-sha256$29000$FeKc8773HmOMcW7tHUPo/Q";
        let parsed = Pbkdf2Record::parse(prototype).unwrap();
        assert_eq!(parsed.digest, None);
        assert_eq!(parsed.encode(), prototype);
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert!(Pbkdf2Record::parse("$pbkdf2-md5$1000$abcd$efgh").is_err());
        assert!(Pbkdf2Record::parse("$pbkdf234").is_err());
    }

    #[test]
    fn rejects_zero_or_non_numeric_rounds() {
        assert!(Pbkdf2Record::parse("$pbkdf2$0$rpVyDoFwDoHwfi8FAGBMqQ").is_err());
        assert!(Pbkdf2Record::parse("$pbkdf2$many$rpVyDoFwDoHwfi8FAGBMqQ").is_err());
    }

    #[test]
    fn rejects_standard_base64() {
        // `+` belongs to standard base64, not the adapted alphabet.
        assert!(Pbkdf2Record::parse("$pbkdf2$1000$ab+d").is_err());
        // Padding is never allowed.
        assert!(Pbkdf2Record::parse("$pbkdf2$1000$rpVyDoFwDoHwfi8FAGBMqQ==").is_err());
    }

    #[test]
    fn rejects_wrong_digest_length() {
        // A SHA-1 identifier carrying a 32-byte digest.
        assert!(
            Pbkdf2Record::parse(
                "$pbkdf2$29000$FeKc8773HmOMcW7tHUPo/Q$Xc31n0kWSaQd7xXJkR0O5W7vHXVCLfKNdKsgiBW.aYc"
            )
            .is_err()
        );
    }

    #[test]
    fn rejects_empty_salt() {
        assert!(Pbkdf2Record::parse("$pbkdf2$1000$$KzxgTFYx.WC8y3G7T.ZRNC16BDs").is_err());
    }
}
