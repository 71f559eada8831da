//! Argon2i password hashing, records prefixed `$argon2i$`.
//!
//! The record carries the argon2 version and the memory, time and
//! parallelism parameters as key-value pairs:
//! `$argon2i$v=19$m=32768,t=4,p=4$salt$hash` with salt and hash in unpadded
//! standard base64. The key-value pairs parse in any order but always encode
//! canonically as `m,t,p`. A record without the trailing hash segment is a
//! prototype. The transform comes from the `argon2` crate.

mod record;

use argon2::{Algorithm, Argon2, Params, Version};

use crate::compare::secure_compare;
use crate::errors::PasswordError;
use crate::scheme::{InvalidParametersError, Scheme, random_bytes};
use record::Argon2Record;

/// Argon2 version encoded into newly issued hashes.
pub const VERSION: u32 = 19;
/// Time cost (t) used for newly issued hashes.
pub const RECOMMENDED_TIME: u32 = 4;
/// Memory cost in KiB (m) used for newly issued hashes.
pub const RECOMMENDED_MEMORY: u32 = 32 * 1024;
/// Parallelism (p) used for newly issued hashes.
pub const RECOMMENDED_THREADS: u32 = 4;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Argon2i scheme with configured cost parameters for new hashes.
#[derive(Debug, Clone)]
pub struct Argon2i {
    time: u32,
    memory: u32,
    threads: u32,
}

impl Argon2i {
    /// Argon2i with the recommended parameters for interactive logins.
    pub fn recommended() -> Self {
        Self {
            time: RECOMMENDED_TIME,
            memory: RECOMMENDED_MEMORY,
            threads: RECOMMENDED_THREADS,
        }
    }

    /// Creates a scheme with explicit cost parameters: time cost, memory
    /// cost in KiB, and parallelism.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter combination is rejected by the
    /// argon2 implementation.
    pub fn new(time: u32, memory: u32, threads: u32) -> Result<Self, InvalidParametersError> {
        Params::new(memory, time, threads, Some(DIGEST_LEN)).map_err(|err| {
            InvalidParametersError {
                reason: format!("invalid argon2 parameters m={memory} t={time} p={threads}: {err}"),
            }
        })?;
        Ok(Self {
            time,
            memory,
            threads,
        })
    }
}

fn compute_digest(
    password: &str,
    salt: &[u8],
    version: u32,
    memory: u32,
    time: u32,
    threads: u32,
    digest_len: usize,
) -> Result<Vec<u8>, PasswordError> {
    let version = match version {
        16 => Version::V0x10,
        19 => Version::V0x13,
        other => {
            return Err(PasswordError::malformed(format!(
                "unsupported argon2 version {other}"
            )));
        }
    };
    let params = Params::new(memory, time, threads, Some(digest_len)).map_err(|err| {
        PasswordError::malformed(format!(
            "invalid argon2 parameters m={memory} t={time} p={threads}: {err}"
        ))
    })?;
    let mut digest = vec![0; digest_len];
    Argon2::new(Algorithm::Argon2i, version, params)
        .hash_password_into(password.as_bytes(), salt, &mut digest)
        .map_err(|err| PasswordError::malformed(format!("argon2 transform failed: {err}")))?;
    Ok(digest)
}

impl Scheme for Argon2i {
    fn recognizes(&self, record: &str) -> bool {
        record.starts_with("$argon2i$")
    }

    fn make_prototype(&self) -> Result<String, PasswordError> {
        let record = Argon2Record {
            version: VERSION,
            memory: self.memory,
            time: self.time,
            threads: self.threads,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        Ok(record.encode())
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut record = Argon2Record {
            version: VERSION,
            memory: self.memory,
            time: self.time,
            threads: self.threads,
            salt: random_bytes::<SALT_LEN>()?.to_vec(),
            digest: None,
        };
        record.digest = Some(compute_digest(
            password,
            &record.salt,
            record.version,
            record.memory,
            record.time,
            record.threads,
            DIGEST_LEN,
        )?);
        Ok(record.encode())
    }

    fn verify(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        let parsed = Argon2Record::parse(record)?;
        let stored = parsed
            .digest
            .as_deref()
            .ok_or(PasswordError::InvalidPassword)?;
        // The record's own version and digest length drive the computation,
        // so records from other implementations verify as long as they are
        // argon2i.
        let computed = compute_digest(
            password,
            &parsed.salt,
            parsed.version,
            parsed.memory,
            parsed.time,
            parsed.threads,
            stored.len(),
        )?;
        if secure_compare(&computed, stored) {
            Ok(())
        } else {
            Err(PasswordError::InvalidPassword)
        }
    }

    fn needs_upgrade(&self, record: &str) -> bool {
        match Argon2Record::parse(record) {
            Ok(parsed) => {
                parsed.salt.len() < SALT_LEN
                    || parsed.time < self.time
                    || parsed.memory < self.memory
                    || parsed.threads < self.threads
            }
            // Advisory only, fail open.
            Err(_) => false,
        }
    }
}
