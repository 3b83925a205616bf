use super::*;

#[test]
fn email_is_trimmed_and_lowercased() {
    assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
}

#[test]
fn malformed_emails_rejected() {
    for bad in ["", "ada", "@example.com", "ada@", "ada@example", "ada@@example.com", "a da@example.com", "ada@.com"] {
        assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn password_minimum_length() {
    assert!(check_password("1234567").is_err());
    assert!(check_password("12345678").is_ok());
}

#[test]
fn display_name_bounds() {
    assert_eq!(normalize_display_name(None).unwrap(), None);
    assert_eq!(normalize_display_name(Some(" Ada ")).unwrap().as_deref(), Some("Ada"));
    assert!(normalize_display_name(Some("   ")).is_err());
    assert!(normalize_display_name(Some(&"x".repeat(101))).is_err());
    assert!(normalize_display_name(Some(&"x".repeat(100))).is_ok());
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(UserError::EmailInUse.error_code(), "EMAIL_IN_USE");
    assert_eq!(UserError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(UserError::Validation(String::new()).error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn register_validates_before_touching_database() {
    let state = crate::state::test_helpers::test_app_state();
    let err = register(&state.pool, "not-an-email", "long-enough", None).await.unwrap_err();
    assert!(matches!(err, UserError::Validation(_)));
    let err = register(&state.pool, "ada@example.com", "short", None).await.unwrap_err();
    assert!(matches!(err, UserError::Validation(_)));
}
