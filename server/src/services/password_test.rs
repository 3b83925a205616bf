use super::*;

#[test]
fn hash_then_verify() {
    let hash = hash_password("correct-horse-battery").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("correct-horse-battery", &hash).unwrap());
}

#[test]
fn wrong_password_is_false_not_error() {
    let hash = hash_password("real-password").unwrap();
    assert!(!verify_password("other-password", &hash).unwrap());
}

#[test]
fn same_password_gets_distinct_salts() {
    assert_ne!(hash_password("repeatable").unwrap(), hash_password("repeatable").unwrap());
}

#[test]
fn malformed_hash_is_error() {
    assert!(verify_password("anything", "not-a-phc-string").is_err());
}
