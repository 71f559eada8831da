//! Password hashing and verification across multiple hashing schemes.
//!
//! This crate produces and verifies self-describing password hash records in
//! modular crypt format: a single column of text encodes the algorithm, its
//! cost parameters, the salt and the digest. An application stores that text,
//! and the library recognizes, verifies and transparently upgrades any of the
//! supported historical formats over the life of the deployment.
//!
//! # Supported schemes
//!
//! - [`schemes::Argon2i`]: Argon2i (`$argon2i$`)
//! - [`schemes::Scrypt`]: scrypt (`$s2$`)
//! - [`schemes::Sha2Crypt`]: glibc SHA-256-crypt and SHA-512-crypt (`$5$`, `$6$`)
//! - [`schemes::BcryptSha256`]: bcrypt over a SHA-256 pre-hash (`$bcrypt-sha256$`)
//! - [`schemes::Pbkdf2`]: PBKDF2-HMAC with SHA-1, SHA-256 or SHA-512 (`$pbkdf2*$`)
//! - [`schemes::Bcrypt`]: bcrypt (`$2a$`, `$2b$`, `$2y$`)
//!
//! The underlying key derivation math comes from the respective ecosystem
//! crates; this crate implements the record grammars, the scheme abstraction
//! and the upgrade policy on top of them.
//!
//! # Upgrade-on-verify
//!
//! [`Context::verify`] returns an optional replacement record. When the stored
//! record was made by a scheme that is no longer the preferred one, or with
//! parameters weaker than the currently configured ones, a successful
//! verification also rehashes the password with the preferred scheme. Store
//! the returned record to migrate users one login at a time.
//!
//! # Example
//!
//! ```
//! let record = passhash::hash("correct horse battery staple")?;
//!
//! // The record is self-describing text, safe to store as-is.
//! assert!(record.starts_with('$'));
//!
//! // A freshly created record verifies and needs no upgrade.
//! assert!(passhash::verify("correct horse battery staple", &record)?.is_none());
//!
//! // A wrong password is rejected.
//! assert!(passhash::verify("incorrect horse", &record).is_err());
//! # Ok::<(), passhash::PasswordError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use lazy_static::lazy_static;

mod compare;
mod context;
mod encoding;
mod errors;
mod scheme;
pub mod schemes;

pub use compare::secure_compare;
pub use context::{
    Context, Defaults, DefaultsAlreadyConfiguredError, InvalidPolicyError, use_defaults,
};
pub use errors::PasswordError;
pub use scheme::{InvalidParametersError, Scheme};

lazy_static! {
    // An unconfigured context, falling back to the process-wide default
    // scheme list (see `use_defaults`).
    static ref DEFAULT_CONTEXT: Context = Context::default();
}

/// Hashes a plaintext password with the default context and returns a record
/// in modular crypt format.
///
/// The preferred scheme of the process-wide default policy is used; call
/// [`use_defaults`] at application startup to select the policy generation.
///
/// # Errors
///
/// Returns [`PasswordError::RandomSource`] if the system random source fails
/// to produce a salt.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    DEFAULT_CONTEXT.hash(password)
}

/// Verifies a plaintext password against a previously stored record, using
/// the default context.
///
/// On success, returns `Some(new_record)` if the stored record should be
/// replaced by a hash made with the currently preferred scheme and
/// parameters, and `None` if the stored record is still up to date. Treat any
/// error as a failed verification.
pub fn verify(password: &str, record: &str) -> Result<Option<String>, PasswordError> {
    DEFAULT_CONTEXT.verify(password, record)
}

/// Determines whether a record should be re-hashed according to the default
/// context's policy.
///
/// Returns `false` for records no configured scheme recognizes or can parse;
/// this function is advisory only.
pub fn needs_upgrade(record: &str) -> bool {
    DEFAULT_CONTEXT.needs_upgrade(record)
}
