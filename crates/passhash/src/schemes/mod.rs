//! The supported password hashing scheme families.
//!
//! Each submodule binds one modular-crypt-format grammar to its key
//! derivation function and implements the [`Scheme`](crate::Scheme)
//! capability set for it. The set of families is closed; new generations are
//! added as new submodules and appended to the versioned default lists in
//! [`Defaults`](crate::Defaults).

pub mod argon2;
pub mod bcrypt;
pub mod bcrypt_sha256;
pub mod pbkdf2;
pub mod scrypt;
pub mod sha2crypt;

pub use self::argon2::Argon2i;
pub use self::bcrypt::Bcrypt;
pub use self::bcrypt_sha256::BcryptSha256;
pub use self::pbkdf2::{Pbkdf2, Pbkdf2Variant};
pub use self::scrypt::Scrypt;
pub use self::sha2crypt::{Sha2Crypt, Sha2Variant};
