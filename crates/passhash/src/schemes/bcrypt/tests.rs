use super::*;
use crate::errors::PasswordError;

// From the original crypt_blowfish test suite.
const OPENWALL_VECTOR: (&str, &str) = (
    "U*U",
    "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW",
);

#[test]
fn verifies_known_answer_vector() {
    let scheme = Bcrypt::recommended();
    let (password, record) = OPENWALL_VECTOR;
    scheme.verify(password, record).unwrap();

    assert!(matches!(
        scheme.verify("U*U*", record),
        Err(PasswordError::InvalidPassword)
    ));
}

#[test]
fn hash_then_verify() {
    let scheme = Bcrypt::new(4).unwrap();
    let record = scheme.hash("test password").unwrap();

    assert!(scheme.recognizes(&record));
    assert!(record.starts_with("$2b$04$"));
    scheme.verify("test password", &record).unwrap();
    assert!(matches!(
        scheme.verify("test  password", &record),
        Err(PasswordError::InvalidPassword)
    ));
}

#[test]
fn fresh_salts_are_unique() {
    let scheme = Bcrypt::new(4).unwrap();
    assert_ne!(
        scheme.make_prototype().unwrap(),
        scheme.make_prototype().unwrap()
    );
}

#[test]
fn prototype_never_verifies() {
    let scheme = Bcrypt::new(4).unwrap();
    let prototype = scheme.make_prototype().unwrap();
    assert!(matches!(
        scheme.verify("anything", &prototype),
        Err(PasswordError::InvalidPassword)
    ));
}

#[test]
fn recognizes_all_minor_versions() {
    let scheme = Bcrypt::recommended();
    assert!(scheme.recognizes("$2a$12$abc"));
    assert!(scheme.recognizes("$2b$12$abc"));
    assert!(scheme.recognizes("$2y$12$abc"));
    assert!(scheme.recognizes("$2$12$abc"));
    assert!(!scheme.recognizes("$2x$12$abc"));
    assert!(!scheme.recognizes("$bcrypt-sha256$2a,12$abc"));
}

#[test]
fn recognized_but_malformed_records_error_out() {
    // `$2$` is recognized for dispatch but rejected on parse, never skipped.
    let scheme = Bcrypt::recommended();
    let err = scheme
        .verify("pw", "$2$12$R7THiKSJilzQRPcvtUCSu.")
        .unwrap_err();
    assert!(matches!(err, PasswordError::MalformedRecord { .. }));
}

#[test]
fn rejects_out_of_range_cost_construction() {
    assert!(Bcrypt::new(3).is_err());
    assert!(Bcrypt::new(32).is_err());
}

#[test]
fn needs_upgrade_on_weaker_cost() {
    let scheme = Bcrypt::recommended();
    // The Openwall vector uses cost 5.
    assert!(scheme.needs_upgrade(OPENWALL_VECTOR.1));
    assert!(!Bcrypt::new(5).unwrap().needs_upgrade(OPENWALL_VECTOR.1));
}

#[test]
fn needs_upgrade_fails_open_on_malformed_records() {
    let scheme = Bcrypt::recommended();
    assert!(!scheme.needs_upgrade("$2$12$R7THiKSJilzQRPcvtUCSu."));
    assert!(!scheme.needs_upgrade("garbage"));
}
