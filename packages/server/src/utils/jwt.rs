use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub phone_number: String,
    /// Expiration timestamp.
    pub exp: usize,
}

/// Why token verification failed. Expired tokens are reported separately so
/// the API can tell the client to log in again.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
    Expired,
    Invalid,
}

/// Sign a new JWT token for a user.
pub fn sign(
    user_id: Uuid,
    email: &str,
    role: &str,
    phone_number: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(ttl_secs))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        role: role.to_owned(),
        phone_number: phone_number.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims, VerifyError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
        _ => VerifyError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn sign_verify_round_trip() {
        let id = Uuid::now_v7();
        let token = sign(id, "a@b.test", "student", "123456", SECRET, 3600).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@b.test");
        assert_eq!(claims.role, "student");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = sign(Uuid::now_v7(), "a@b.test", "student", "1", SECRET, 3600).unwrap();
        assert!(matches!(
            verify(&token, "other-secret"),
            Err(VerifyError::Invalid)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // jsonwebtoken applies a default 60s leeway; go well past it.
        let token = sign(Uuid::now_v7(), "a@b.test", "student", "1", SECRET, -120).unwrap();
        assert!(matches!(verify(&token, SECRET), Err(VerifyError::Expired)));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            verify("not-a-token", SECRET),
            Err(VerifyError::Invalid)
        ));
    }
}
