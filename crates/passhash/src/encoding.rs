//! Base64 dialects and numeric parsing shared by the record grammars.
//!
//! Each scheme family pins its own base64 flavor and the codecs must not mix
//! them up:
//!
//! - scrypt records use standard base64 **with** padding
//! - argon2 records use standard base64 without padding
//! - pbkdf2 records use "adapted base64": the standard alphabet with `+`
//!   replaced by `.`, unpadded
//! - bcrypt records use the bcrypt radix-64 alphabet `./A-Za-z0-9`, unpadded
//!
//! All decoding is strict: stray padding, characters outside the alphabet and
//! non-canonical trailing bits are rejected, so that re-encoding a decoded
//! value always reproduces the original text.

use base64::Engine as _;
use base64::alphabet::{self, Alphabet};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::errors::PasswordError;

pub(crate) use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

const NO_PAD_STRICT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::RequireNone);

const AB64_ALPHABET: Alphabet = match Alphabet::new(
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789./",
) {
    Ok(alphabet) => alphabet,
    Err(_) => panic!("adapted base64 alphabet is invalid"),
};

/// Adapted base64 as used in pbkdf2 records.
pub(crate) const AB64: GeneralPurpose = GeneralPurpose::new(&AB64_ALPHABET, NO_PAD_STRICT);

/// bcrypt's radix-64 encoding.
pub(crate) const BCRYPT64: GeneralPurpose = GeneralPurpose::new(&alphabet::BCRYPT, NO_PAD_STRICT);

/// glibc crypt's salt alphabet; only used to draw fresh sha2-crypt salts.
pub(crate) const CRYPT64: GeneralPurpose = GeneralPurpose::new(&alphabet::CRYPT, NO_PAD_STRICT);

pub(crate) fn decode(
    engine: &GeneralPurpose,
    segment: &str,
    what: &str,
) -> Result<Vec<u8>, PasswordError> {
    engine
        .decode(segment)
        .map_err(|err| PasswordError::malformed(format!("invalid base64 in {what}: {err}")))
}

pub(crate) fn encode(engine: &GeneralPurpose, bytes: &[u8]) -> String {
    engine.encode(bytes)
}

/// Parses a strictly canonical decimal number: ASCII digits only, no sign and
/// no leading zeros. Anything else would not round-trip through re-encoding.
pub(crate) fn parse_decimal(segment: &str, what: &str) -> Result<u32, PasswordError> {
    if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(PasswordError::malformed(format!(
            "{what} must be a decimal number, got {segment:?}"
        )));
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(PasswordError::malformed(format!(
            "{what} must not have leading zeros, got {segment:?}"
        )));
    }
    segment
        .parse()
        .map_err(|_| PasswordError::malformed(format!("{what} is out of range: {segment}")))
}
