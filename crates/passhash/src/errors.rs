use thiserror::Error;

/// Errors reported by hashing and verification operations.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// The record text violates its scheme's grammar: wrong field count,
    /// invalid base64, a non-numeric value where a number is required, or a
    /// parameter outside its valid range. Out-of-range values are never
    /// silently clamped.
    #[error("malformed password record: {reason}")]
    MalformedRecord {
        /// What exactly was wrong with the record.
        reason: String,
    },

    /// No configured scheme recognizes the record.
    #[error("no configured scheme recognizes the password record")]
    UnsupportedScheme,

    /// The record is well-formed but the password does not match its digest.
    #[error("incorrect password")]
    InvalidPassword,

    /// The system random source failed while generating a salt. This is fatal
    /// to hashing and never swallowed.
    #[error("system random source failed: {0}")]
    RandomSource(#[from] rand_core::OsError),
}

impl PasswordError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        PasswordError::MalformedRecord {
            reason: reason.into(),
        }
    }
}
