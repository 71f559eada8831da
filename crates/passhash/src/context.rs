//! The scheme registry: dispatch, verify-with-upgrade and versioned default
//! scheme lists.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use derive_more::{Display, Error};
use log::warn;

use crate::errors::PasswordError;
use crate::scheme::Scheme;
use crate::schemes::{Argon2i, Bcrypt, BcryptSha256, Pbkdf2, Scrypt, Sha2Crypt};

/// A named generation of the default scheme list.
///
/// The lists only ever grow backward-compatibly: every scheme present in an
/// older generation is still present (and verifiable) in newer ones, so a
/// fleet where instances run different generations never produces a record
/// that another instance cannot verify. Moving the preferred scheme to a new
/// generation is a deliberate operation done via [`use_defaults`], never
/// something that happens implicitly over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defaults {
    /// The 2016-09-22 generation: scrypt is preferred, argon2 is absent.
    V20160922,
    /// The 2018-06-01 generation: argon2i is preferred.
    V20180601,
    /// The newest generation. Only use this if nothing in your fleet relies
    /// on an older generation being the hashing default.
    Latest,
}

impl Defaults {
    /// Builds the scheme list of this generation, most preferred first.
    pub fn schemes(self) -> Vec<Arc<dyn Scheme>> {
        let mut schemes: Vec<Arc<dyn Scheme>> = match self {
            Defaults::V20160922 => vec![],
            Defaults::V20180601 | Defaults::Latest => vec![Arc::new(Argon2i::recommended())],
        };
        schemes.extend([
            Arc::new(Scrypt::recommended()) as Arc<dyn Scheme>,
            Arc::new(Sha2Crypt::sha256()),
            Arc::new(Sha2Crypt::sha512()),
            Arc::new(BcryptSha256::recommended()),
            Arc::new(Pbkdf2::sha256()),
            Arc::new(Pbkdf2::sha512()),
            Arc::new(Pbkdf2::sha1()),
            Arc::new(Bcrypt::recommended()),
        ]);
        schemes
    }
}

/// The policy token could not be parsed.
#[derive(Error, Display, Debug)]
#[display("unknown defaults policy token: {token}")]
pub struct InvalidPolicyError {
    /// The token that was rejected.
    pub token: String,
}

impl FromStr for Defaults {
    type Err = InvalidPolicyError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "20160922" => Ok(Defaults::V20160922),
            "20180601" => Ok(Defaults::V20180601),
            "latest" => Ok(Defaults::Latest),
            _ => Err(InvalidPolicyError {
                token: token.to_owned(),
            }),
        }
    }
}

static DEFAULT_SCHEMES: OnceLock<Vec<Arc<dyn Scheme>>> = OnceLock::new();

/// The process-wide default scheme list was already fixed, either by an
/// earlier [`use_defaults`] call or by first use of an unconfigured context.
#[derive(Error, Display, Debug)]
#[display("the process-wide default schemes are already configured")]
pub struct DefaultsAlreadyConfiguredError;

/// Selects the process-wide default scheme list.
///
/// Call this once at application startup, before any hashing or verification
/// through an unconfigured [`Context`]. If it is never called, the
/// conservative [`Defaults::V20160922`] generation is used so that records
/// made by this process stay verifiable by the oldest deployments.
///
/// # Errors
///
/// Fails if the default list was already fixed; the list is never mutated
/// once a context has read it.
pub fn use_defaults(policy: Defaults) -> Result<(), DefaultsAlreadyConfiguredError> {
    DEFAULT_SCHEMES
        .set(policy.schemes())
        .map_err(|_| DefaultsAlreadyConfiguredError)
}

fn default_schemes() -> &'static [Arc<dyn Scheme>] {
    DEFAULT_SCHEMES.get_or_init(|| Defaults::V20160922.schemes())
}

/// An ordered collection of schemes implementing dispatch and the
/// upgrade-on-verify policy.
///
/// The first scheme in the list hashes new passwords; any scheme in the list
/// may verify existing records. The list is fixed at construction, so a
/// context can be shared freely between threads.
///
/// An unconfigured context (`Context::default()`) falls back to the
/// process-wide default list, see [`use_defaults`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use passhash::Context;
/// use passhash::schemes::{Pbkdf2, Scrypt};
///
/// // An old deployment hashed with pbkdf2.
/// let old = Context::with_schemes(vec![Arc::new(Pbkdf2::sha256())]);
/// let record = old.hash("hunter2")?;
///
/// // The new deployment prefers scrypt and upgrades on verify.
/// let new = Context::with_schemes(vec![
///     Arc::new(Scrypt::recommended()),
///     Arc::new(Pbkdf2::sha256()),
/// ]);
/// let upgraded = new.verify("hunter2", &record)?.expect("an upgrade record");
/// assert!(upgraded.starts_with("$s2$"));
///
/// // The upgraded record is current, no further upgrade is requested.
/// assert!(new.verify("hunter2", &upgraded)?.is_none());
/// # Ok::<(), passhash::PasswordError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    schemes: Vec<Arc<dyn Scheme>>,
}

impl Context {
    /// Creates a context holding the default scheme list of the given
    /// generation.
    pub fn new(defaults: Defaults) -> Self {
        Self {
            schemes: defaults.schemes(),
        }
    }

    /// Creates a context from an explicit scheme list, most preferred first.
    ///
    /// An empty list behaves like `Context::default()`: operations fall back
    /// to the process-wide default list.
    pub fn with_schemes(schemes: Vec<Arc<dyn Scheme>>) -> Self {
        Self { schemes }
    }

    fn schemes(&self) -> &[Arc<dyn Scheme>] {
        if self.schemes.is_empty() {
            default_schemes()
        } else {
            &self.schemes
        }
    }

    fn preferred(&self) -> &Arc<dyn Scheme> {
        self.schemes()
            .first()
            .expect("the default scheme lists are never empty")
    }

    /// Generates a prototype record for the preferred scheme.
    pub fn make_prototype(&self) -> Result<String, PasswordError> {
        self.preferred().make_prototype()
    }

    /// Hashes a password with the preferred scheme.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.preferred().hash(password)
    }

    /// Verifies a password against a record made by any of the configured
    /// schemes.
    ///
    /// On success, returns `Some(new_record)` when the record should be
    /// re-hashed: either it was verified by a scheme that is not the
    /// preferred one, or its own scheme considers its parameters too weak.
    /// Producing the upgrade record is best-effort; if re-hashing fails the
    /// verification still succeeds and `None` is returned.
    ///
    /// # Errors
    ///
    /// [`PasswordError::UnsupportedScheme`] if no configured scheme
    /// recognizes the record; otherwise whatever the recognizing scheme's
    /// [`Scheme::verify`] reports. Treat any error as a failed verification.
    pub fn verify(&self, password: &str, record: &str) -> Result<Option<String>, PasswordError> {
        self.verify_with_upgrade(password, record, true)
    }

    /// Verifies a password without ever computing an upgrade record.
    ///
    /// Use this on read-only paths where a replacement record could not be
    /// stored anyway.
    pub fn verify_no_upgrade(&self, password: &str, record: &str) -> Result<(), PasswordError> {
        self.verify_with_upgrade(password, record, false)
            .map(|_| ())
    }

    fn verify_with_upgrade(
        &self,
        password: &str,
        record: &str,
        allow_upgrade: bool,
    ) -> Result<Option<String>, PasswordError> {
        let schemes = self.schemes();
        for (index, scheme) in schemes.iter().enumerate() {
            if !scheme.recognizes(record) {
                continue;
            }
            // A recognized record is this scheme's responsibility: parse and
            // verification failures surface instead of trying later schemes.
            scheme.verify(password, record)?;

            if allow_upgrade && (index != 0 || scheme.needs_upgrade(record)) {
                return match self.hash(password) {
                    Ok(upgraded) => Ok(Some(upgraded)),
                    Err(err) => {
                        // Upgrading is opportunistic; a rehash failure must
                        // not turn a successful verification into a failure.
                        warn!("verified password but re-hashing with the preferred scheme failed: {err}");
                        Ok(None)
                    }
                };
            }
            return Ok(None);
        }
        Err(PasswordError::UnsupportedScheme)
    }

    /// Determines whether a record should be re-hashed under this context's
    /// policy.
    ///
    /// Dispatches to the first recognizing scheme's
    /// [`Scheme::needs_upgrade`]; records nobody recognizes return `false`.
    /// Note that unlike [`Context::verify`] this does not consider the
    /// position of the recognizing scheme in the list.
    pub fn needs_upgrade(&self, record: &str) -> bool {
        self.schemes()
            .iter()
            .find(|scheme| scheme.recognizes(record))
            .is_some_and(|scheme| scheme.needs_upgrade(record))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schemes::{Pbkdf2Variant, Sha2Variant};

    fn fast_context() -> Context {
        Context::with_schemes(vec![
            Arc::new(Scrypt::new(1024, 8, 1).unwrap()),
            Arc::new(Sha2Crypt::new(Sha2Variant::Sha256, 1000).unwrap()),
            Arc::new(Pbkdf2::new(Pbkdf2Variant::Sha256, 1000).unwrap()),
        ])
    }

    #[test]
    fn hash_uses_the_first_scheme() {
        let context = fast_context();
        let record = context.hash("pw").unwrap();
        assert!(record.starts_with("$s2$1024$8$1$"));
    }

    #[test]
    fn verify_dispatches_to_the_recognizing_scheme() {
        let context = fast_context();
        let record = Pbkdf2::new(Pbkdf2Variant::Sha256, 1000)
            .unwrap()
            .hash("pw")
            .unwrap();

        // Valid, but made by a non-preferred scheme: an upgrade is issued.
        let upgraded = context.verify("pw", &record).unwrap().unwrap();
        assert!(upgraded.starts_with("$s2$1024$8$1$"));
        assert!(context.verify("pw", &upgraded).unwrap().is_none());
    }

    #[test]
    fn verify_upgrades_weak_parameters_of_the_preferred_scheme() {
        let weak = Scrypt::new(512, 8, 1).unwrap().hash("pw").unwrap();
        let context = fast_context();
        assert!(context.needs_upgrade(&weak));

        let upgraded = context.verify("pw", &weak).unwrap().unwrap();
        assert!(upgraded.starts_with("$s2$1024$8$1$"));
    }

    #[test]
    fn verify_no_upgrade_never_rehashes() {
        let context = fast_context();
        let record = Pbkdf2::new(Pbkdf2Variant::Sha256, 1000)
            .unwrap()
            .hash("pw")
            .unwrap();
        context.verify_no_upgrade("pw", &record).unwrap();
    }

    #[test]
    fn wrong_password_yields_no_upgrade_record() {
        let context = fast_context();
        let record = context.hash("pw").unwrap();
        assert!(matches!(
            context.verify("other", &record),
            Err(PasswordError::InvalidPassword)
        ));
    }

    #[test]
    fn unrecognized_records_are_unsupported() {
        let context = fast_context();
        assert!(matches!(
            context.verify("pw", "$md5$abc$def"),
            Err(PasswordError::UnsupportedScheme)
        ));
        assert!(matches!(
            context.verify("pw", "plaintext"),
            Err(PasswordError::UnsupportedScheme)
        ));
        assert!(!context.needs_upgrade("$md5$abc$def"));
    }

    #[test]
    fn recognized_but_malformed_records_are_not_skipped() {
        let context = fast_context();
        // Recognized by the scrypt scheme, but malformed: must surface the
        // parse error instead of falling through to later schemes.
        assert!(matches!(
            context.verify("pw", "$s2$banana$8$1$abc"),
            Err(PasswordError::MalformedRecord { .. })
        ));
    }

    #[rstest]
    #[case::oldest(Defaults::V20160922, "$s2$16384$8$1$")]
    #[case::argon2_era(Defaults::V20180601, "$argon2i$v=19$m=32768,t=4,p=4$")]
    #[case::latest(Defaults::Latest, "$argon2i$v=19$m=32768,t=4,p=4$")]
    fn default_generations_prefer_the_right_scheme(
        #[case] defaults: Defaults,
        #[case] prefix: &str,
    ) {
        let prototype = Context::new(defaults).make_prototype().unwrap();
        assert!(
            prototype.starts_with(prefix),
            "{prototype} does not start with {prefix}"
        );
    }

    #[test]
    fn newer_generations_verify_older_records() {
        let old = Context::new(Defaults::V20160922);
        let record = old.hash("pw").unwrap();

        let new = Context::new(Defaults::V20180601);
        let upgraded = new.verify("pw", &record).unwrap().unwrap();
        assert!(upgraded.starts_with("$argon2i$"));
        assert!(new.verify("pw", &upgraded).unwrap().is_none());
    }

    #[test]
    fn policy_tokens_parse() {
        assert_eq!("20160922".parse::<Defaults>().unwrap(), Defaults::V20160922);
        assert_eq!("20180601".parse::<Defaults>().unwrap(), Defaults::V20180601);
        assert_eq!("latest".parse::<Defaults>().unwrap(), Defaults::Latest);
        assert!("yesterday".parse::<Defaults>().is_err());
    }

    #[test]
    fn use_defaults_is_rejected_once_the_defaults_are_in_use() {
        // Force initialization of the process-wide list, as any unconfigured
        // context operation would.
        let _ = Context::default().needs_upgrade("$nonsense");
        assert!(use_defaults(Defaults::V20180601).is_err());
    }

    #[test]
    fn every_generation_lists_each_family_once() {
        for defaults in [Defaults::V20160922, Defaults::V20180601, Defaults::Latest] {
            let schemes = defaults.schemes();
            let record = "$pbkdf2-sha512$25000$Rug9hxCCEAJAqBXCeO99rw";
            let recognizing = schemes
                .iter()
                .filter(|scheme| scheme.recognizes(record))
                .count();
            assert_eq!(recognizing, 1);
        }
    }
}
