//! Session token generation and validation
//!
//! Tokens are HS256 JWTs carrying the user id and role. Verification is a
//! pure function of token, key and clock; it never consults the database, so
//! a deleted user stays token-valid until expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserRole;

/// Token-related errors
///
/// The taxonomy stays internal: the HTTP surface collapses all verification
/// failures into one generic 401, but logs keep the distinction.
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Extract the user id from the subject claim
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::InvalidClaims(e.to_string()))
    }

    /// Extract the role claim
    pub fn role(&self) -> Result<UserRole, JwtError> {
        UserRole::parse(&self.role)
            .ok_or_else(|| JwtError::InvalidClaims(format!("unknown role: {}", self.role)))
    }
}

/// Signing configuration, built once at startup
///
/// Holds the precomputed encoding/decoding keys for the process-wide signing
/// secret. Cloned into the places that need it; never mutated afterwards.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl JwtConfig {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a signed session token for a user
    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify and decode a session token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key", 86400)
    }

    #[test]
    fn test_issue_and_verify() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = config.issue(user_id, UserRole::Applicant).unwrap();
        assert!(!token.is_empty());

        let claims = config.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role().unwrap(), UserRole::Applicant);
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_verify_is_idempotent() {
        let config = test_config();
        let token = config.issue(Uuid::new_v4(), UserRole::Admin).unwrap();

        let first = config.verify(&token).unwrap();
        let second = config.verify(&token).unwrap();
        assert_eq!(first.sub, second.sub);
        assert_eq!(first.exp, second.exp);
    }

    #[test]
    fn test_expired_token() {
        // TTL far enough in the past to clear the default validation leeway
        let config = JwtConfig::new("test-secret-key", -120);
        let token = config.issue(Uuid::new_v4(), UserRole::Applicant).unwrap();

        let result = config.verify(&token);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtConfig::new("secret-one", 900)
            .issue(Uuid::new_v4(), UserRole::Applicant)
            .unwrap();

        let result = JwtConfig::new("secret-two", 900).verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_signature() {
        let config = test_config();
        let token = config.issue(Uuid::new_v4(), UserRole::Applicant).unwrap();

        // Flip the first character of the signature segment
        let dot = token.rfind('.').unwrap();
        let (head, signature) = token.split_at(dot + 1);
        let first = signature.chars().next().unwrap();
        let flipped = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}{}{}", head, flipped, &signature[1..]);
        assert_ne!(token, tampered);

        let result = config.verify(&tampered);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_malformed_token() {
        let config = test_config();
        assert!(matches!(
            config.verify("not-a-token"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(
            config.verify("still.not.a.token"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(config.verify(""), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_unknown_role_claim_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "superuser".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.role(), Err(JwtError::InvalidClaims(_))));
    }
}
