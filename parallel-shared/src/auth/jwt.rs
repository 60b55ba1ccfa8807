/// Session token signing and validation
///
/// A session token is an HS256-signed JWT whose subject is the user ID.
/// Tokens are self-contained: signing out only drops the client's copy.
///
/// # Claims
///
/// - `sub`: user ID
/// - `iss`: always "parallel"
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use parallel_shared::auth::jwt::{SessionKeys, validate_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = SessionKeys::new("a-secret-of-at-least-thirty-two-bytes!", Duration::hours(1));
/// let user_id = Uuid::new_v4();
///
/// let token = keys.issue(user_id)?;
/// let claims = validate_token(&token, &keys.secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer stamped on every token
pub const ISSUER: &str = "parallel";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "parallel"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims valid from now for `ttl`
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signing secret and token lifetime, passed explicitly to the operations
/// that issue or check sessions
#[derive(Debug, Clone)]
pub struct SessionKeys {
    pub secret: String,
    pub ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Signs a fresh session token for a user
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        create_token(&Claims::new(user_id, self.ttl), &self.secret)
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates signature, expiry, not-before and issuer
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(2));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "parallel");
        assert_eq!(claims.exp - claims.iat, 7200);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_issue_and_validate() {
        let keys = SessionKeys::new(SECRET, Duration::hours(1));
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id).expect("Token creation should succeed");
        let claims = validate_token(&token, SECRET).expect("Validation should succeed");

        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let keys = SessionKeys::new(SECRET, Duration::hours(1));
        let token = keys.issue(Uuid::new_v4()).unwrap();

        let result = validate_token(&token, "a-different-secret-of-enough-length!!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.iat -= 7200;
        claims.nbf -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(validate_token("not.a.token", SECRET).is_err());
    }
}
