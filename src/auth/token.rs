// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::auth::models::Role;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub username: String,
    pub role: Role,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Token service for JWT operations
pub struct TokenService {
    secret: String,
    access_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens cover a full shift: 8 hours (28800 seconds)
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_token_duration: 28800, // 8 hours
        }
    }

    /// Generate an access token for a staff account
    pub fn generate_access_token(
        &self,
        user_id: i32,
        username: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now + self.access_token_duration;

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role,
            iat: now,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            if e.to_string().contains("ExpiredSignature") {
                AuthError::ExpiredToken
            } else {
                AuthError::InvalidToken
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_access_token_expiration_is_8_hours() {
        let service = test_token_service();
        let token = service
            .generate_access_token(1, "reception", Role::Staff)
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        let duration = claims.exp - claims.iat;
        assert_eq!(duration, 28800);
    }

    #[test]
    fn test_token_claims_contain_identity_and_role() {
        let service = test_token_service();
        let token = service
            .generate_access_token(7, "manager1", Role::Manager)
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "manager1");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let service = test_token_service();
        let other = TokenService::new("a_completely_different_secret".to_string());

        let token = service
            .generate_access_token(1, "reception", Role::Staff)
            .unwrap();
        let result = other.validate_access_token(&token);

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_token_service();

        let claims = Claims {
            sub: 1,
            username: "reception".to_string(),
            role: Role::Staff,
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        let result = service.validate_access_token(&token);
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    proptest! {
        // Any generated token round-trips through validation
        #[test]
        fn prop_generated_tokens_validate(
            user_id in 1i32..1000000,
            username in "[a-z][a-z0-9_]{2,19}",
        ) {
            let service = test_token_service();
            let token = service.generate_access_token(user_id, &username, Role::Staff)?;
            let claims = service.validate_access_token(&token)?;

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.username, username);
        }

        // Random strings are never valid tokens
        #[test]
        fn prop_malformed_tokens_rejected(garbage in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate_access_token(&garbage).is_err());
        }
    }
}
