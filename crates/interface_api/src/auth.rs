//! Authentication and authorization
//!
//! Brokers and reviewers authenticate with a bearer JWT. The subject is the
//! broker id for brokers and the reviewer id for holders of the `admin` role.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{BrokerId, ReviewerId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (broker or reviewer id)
    pub sub: String,
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn broker_id(&self) -> Result<BrokerId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }

    pub fn reviewer_id(&self) -> Result<ReviewerId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == roles::ADMIN)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject '{0}' is not a valid id")]
    InvalidSubject(String),
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
pub fn create_token(
    subject: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: subject.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == roles::ADMIN)
}

/// Role names carried in tokens
pub mod roles {
    pub const BROKER: &str = "broker";
    /// Review authority for consents and listings
    pub const ADMIN: &str = "admin";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let broker = BrokerId::new();
        let token = create_token(&broker.to_string(), vec![roles::BROKER.into()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.broker_id().unwrap(), broker);
        assert!(!claims.is_admin());
        assert!(has_role(&claims, roles::BROKER));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("BRK-x", vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_has_every_role() {
        let claims = Claims {
            sub: ReviewerId::new().to_string(),
            roles: vec![roles::ADMIN.into()],
            exp: 0,
            iat: 0,
        };
        assert!(claims.is_admin());
        assert!(has_role(&claims, roles::BROKER));
        assert!(claims.reviewer_id().is_ok());
    }

    #[test]
    fn test_garbage_subject() {
        let claims = Claims {
            sub: "not-an-id".into(),
            roles: vec![],
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.broker_id(), Err(AuthError::InvalidSubject(_))));
    }
}
