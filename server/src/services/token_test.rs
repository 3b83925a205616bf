use super::*;

fn config() -> JwtConfig {
    JwtConfig {
        access_secret: "access-secret-for-tests".into(),
        refresh_secret: "refresh-secret-for-tests".into(),
        access_expires_mins: 15,
        refresh_expires_days: 30,
    }
}

#[test]
fn access_token_round_trips_subject() {
    let cfg = config();
    let user = Uuid::new_v4();
    let token = issue(user, TokenKind::Access, &cfg).unwrap();
    assert_eq!(verify(&token, TokenKind::Access, &cfg).unwrap(), user);
}

#[test]
fn refresh_token_is_not_an_access_token() {
    let cfg = config();
    let token = issue(Uuid::new_v4(), TokenKind::Refresh, &cfg).unwrap();
    assert!(verify(&token, TokenKind::Refresh, &cfg).is_ok());
    assert!(verify(&token, TokenKind::Access, &cfg).is_err());
}

#[test]
fn same_secret_still_checks_typ() {
    let mut cfg = config();
    cfg.refresh_secret = cfg.access_secret.clone();
    let token = issue(Uuid::new_v4(), TokenKind::Refresh, &cfg).unwrap();
    assert!(matches!(verify(&token, TokenKind::Access, &cfg), Err(TokenError::WrongKind)));
}

#[test]
fn expired_token_is_reported_as_expired() {
    let cfg = config();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims { sub: Uuid::new_v4(), typ: TokenKind::Access, exp: now - 600, iat: now - 1200, jti: "x".into() };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(cfg.access_secret.as_bytes())).unwrap();
    let err = verify(&token, TokenKind::Access, &cfg).unwrap_err();
    assert!(matches!(err, TokenError::Expired));
    assert_eq!(err.error_code(), "TOKEN_EXPIRED");
}

#[test]
fn garbage_is_invalid() {
    let err = verify("not.a.jwt", TokenKind::Access, &config()).unwrap_err();
    assert_eq!(err.error_code(), "TOKEN_INVALID");
}

#[test]
fn lifetimes_follow_config() {
    let cfg = config();
    assert_eq!(lifetime_secs(TokenKind::Access, &cfg), 900);
    assert_eq!(lifetime_secs(TokenKind::Refresh, &cfg), 30 * 86_400);
}
