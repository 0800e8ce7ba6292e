//! Session and reset tokens.
//!
//! Both kinds are HS256 JWTs signed with the same configured secret; what keeps
//! them apart is the `purpose` claim plus deliberately different claim sets.
//! Verifiers check purpose explicitly because JSON decoding alone would accept a
//! session token wherever its fields form a superset of the expected shape.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::User;

pub const SESSION_TTL_HOURS: i64 = 8;
pub const RESET_TTL_HOURS: i64 = 1;

/// Uniform verification failure. Signature, shape, purpose and expiry problems
/// are indistinguishable to callers.
#[derive(Debug, Error)]
#[error("token did not verify")]
pub struct InvalidToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Claims carried by a login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: i64,
    pub email: String,
    pub id_tipo: i64,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a password-reset link. Minimal on purpose: no email and no
/// role, so the session gate has nothing session-shaped to accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// User id.
    pub sub: i64,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_session(keys: &TokenKeys, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    issue_session_at(keys, user, Utc::now())
}

fn issue_session_at(
    keys: &TokenKeys,
    user: &User,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user.id_u,
        email: user.email.clone(),
        id_tipo: user.id_tipo,
        purpose: TokenPurpose::Session,
        iat: now.timestamp(),
        exp: expiry(now, SESSION_TTL_HOURS),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

pub fn issue_reset(keys: &TokenKeys, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
    issue_reset_at(keys, user_id, Utc::now())
}

fn issue_reset_at(
    keys: &TokenKeys,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = ResetClaims {
        sub: user_id,
        purpose: TokenPurpose::PasswordReset,
        iat: now.timestamp(),
        exp: expiry(now, RESET_TTL_HOURS),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

pub fn verify_session(keys: &TokenKeys, token: &str) -> Result<SessionClaims, InvalidToken> {
    let data = decode::<SessionClaims>(token, &keys.decoding, &validation())
        .map_err(|_| InvalidToken)?;
    if data.claims.purpose != TokenPurpose::Session {
        return Err(InvalidToken);
    }
    Ok(data.claims)
}

pub fn verify_reset(keys: &TokenKeys, token: &str) -> Result<ResetClaims, InvalidToken> {
    let data =
        decode::<ResetClaims>(token, &keys.decoding, &validation()).map_err(|_| InvalidToken)?;
    if data.claims.purpose != TokenPurpose::PasswordReset {
        return Err(InvalidToken);
    }
    Ok(data.claims)
}

fn validation() -> Validation {
    Validation::new(Algorithm::HS256)
}

fn expiry(now: DateTime<Utc>, hours: i64) -> i64 {
    now.checked_add_signed(Duration::hours(hours))
        .unwrap_or(now)
        .timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("secreto-de-prueba")
    }

    fn chofer() -> User {
        User {
            id_u: 7,
            nombre: "Ana".into(),
            ap_pat: None,
            ap_mat: None,
            email: "ana@rastreo.mx".into(),
            password: "hash".into(),
            n_tel: None,
            id_tipo: 3,
            id_vehiculo: Some(4),
            password_changed_at: None,
        }
    }

    #[test]
    fn session_round_trip_preserves_claims() {
        let keys = keys();
        let token = issue_session(&keys, &chofer()).unwrap();
        let claims = verify_session(&keys, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ana@rastreo.mx");
        assert_eq!(claims.id_tipo, 3);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_HOURS * 3600);
    }

    #[test]
    fn expired_session_is_rejected() {
        let keys = keys();
        let issued_long_ago = Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1);
        let token = issue_session_at(&keys, &chofer(), issued_long_ago).unwrap();
        assert!(verify_session(&keys, &token).is_err());
    }

    #[test]
    fn expired_reset_is_rejected() {
        let keys = keys();
        let token = issue_reset_at(&keys, 7, Utc::now() - Duration::hours(2)).unwrap();
        assert!(verify_reset(&keys, &token).is_err());
    }

    #[test]
    fn fresh_reset_verifies() {
        let keys = keys();
        let token = issue_reset(&keys, 7).unwrap();
        let claims = verify_reset(&keys, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.exp - claims.iat, RESET_TTL_HOURS * 3600);
    }

    #[test]
    fn purposes_do_not_cross() {
        let keys = keys();
        let session = issue_session(&keys, &chofer()).unwrap();
        let reset = issue_reset(&keys, 7).unwrap();
        // A session token passed to the reset verifier decodes but carries the
        // wrong purpose; a reset token lacks the session claim set entirely.
        assert!(verify_reset(&keys, &session).is_err());
        assert!(verify_session(&keys, &reset).is_err());
    }

    #[test]
    fn tampered_and_foreign_tokens_are_rejected() {
        let keys = keys();
        let token = issue_session(&keys, &chofer()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_session(&keys, &tampered).is_err());

        let other_keys = TokenKeys::new("otro-secreto");
        assert!(verify_session(&other_keys, &token).is_err());

        assert!(verify_session(&keys, "no-es-un-jwt").is_err());
    }
}
