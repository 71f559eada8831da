//! scrypt password hashing, records prefixed `$s2$`.
//!
//! The record spells out the three scrypt cost parameters in the clear:
//! `$s2$N$r$p$salt$hash` with salt and hash in standard (padded) base64.
//! The digest is always 32 bytes. The transform comes from the `scrypt`
//! crate.

mod record;

use scrypt::Params;

use crate::compare::secure_compare;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::ScryptRecord;

/// CPU/memory cost (N) used for newly issued hashes. Must be a power of two.
pub const RECOMMENDED_N: u32 = 16_384;
/// Block size (r) used for newly issued hashes.
pub const RECOMMENDED_R: u32 = 8;
/// Parallelization (p) used for newly issued hashes.
pub const RECOMMENDED_P: u32 = 1;

const SALT_LEN: usize = 18;
const DIGEST_LEN: usize = 32;

/// scrypt scheme with configured cost parameters for new hashes.
#[derive(Debug, Clone)]
pub struct Scrypt {
    n: u32,
    r: u32,
    p: u32,
}

impl Scrypt {
    /// scrypt with the recommended parameters for interactive logins.
    pub fn recommended() -> Self {
        Self {
            n: RECOMMENDED_N,
            r: RECOMMENDED_R,
            p: RECOMMENDED_P,
        }
    }

    /// Creates a scheme with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is not a power of two of at least 2, or if the
    /// parameter combination is rejected by the scrypt implementation.
    pub fn new(n: u32, r: u32, p: u32) -> Result<Self, InvalidParametersError> {
        cost_params(n, r, p, DIGEST_LEN)
            .map_err(|reason| InvalidParametersError { reason })?;
        Ok(Self { n, r, p })
    }
}

fn cost_params(n: u32, r: u32, p: u32, len: usize) -> Result<Params, String> {
    if n < 2 || !n.is_power_of_two() {
        return Err(format!(
            "scrypt parameter n={n} must be a power of 2 and at least 2"
        ));
    }
    let log_n = n.trailing_zeros() as u8;
    Params::new(log_n, r, p, len)
        .map_err(|err| format!("invalid scrypt parameters n={n} r={r} p={p}: {err}"))
}

fn compute_digest(
    password: &str,
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
) -> Result<Vec<u8>, PasswordError> {
    let params = cost_params(n, r, p, DIGEST_LEN).map_err(PasswordError::malformed)?;
    let mut digest = vec![0; DIGEST_LEN];
    scrypt::scrypt(password.as_bytes(), salt, &params, &mut digest)
        .map_err(|err| PasswordError::malformed(format!("scrypt rejected output length: {err}")))?;
    Ok(digest)
}

impl Scheme for Scrypt {
    fn recognizes(&self, record: &str) -> bool {
        record.starts_with("$s2$")
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        let record = ScryptRecord {
            n: self.n,
            r: self.r,
            p: self.p,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        Ok(record.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = ScryptRecord {
            n: self.n,
            r: self.r,
            p: self.p,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        record.digest = Some(compute_digest(
            password,
            &record.salt,
            record.n,
            record.r,
            record.p,
        )?);
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = ScryptRecord::parse(record)?;
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        let computed = compute_digest(password, &parsed.salt, parsed.n, parsed.r, parsed.p)?;
        if secure_compare(&computed, stored) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match ScryptRecord::parse(record) {
            Ok(parsed) => {
                parsed.salt.len() < SALT_LEN
                    || parsed.n < self.n
                    || parsed.r < self.r
                    || parsed.p < self.p
            }
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}
