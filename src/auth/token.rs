use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Issues and verifies signed session tokens.
///
/// The signing secret is provided once at construction (from [`crate::config::Config`])
/// rather than read from ambient process state at every call site. Note that a
/// cryptographically valid token is only half of a valid session: the store must
/// also still hold the token in the user's active-token collection.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Generates a session token for the given user, expiring in 24 hours.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(24))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and expiry and decodes its claims.
    ///
    /// Any failure (malformed token, bad signature, expired) collapses to the
    /// uniform authentication error.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::unauthenticated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AUTH_FAILURE_MESSAGE;

    #[test]
    fn test_token_issue_and_verify() {
        let signer = TokenSigner::new("test_secret_for_gen_verify");
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id).unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_expired_token_is_rejected_uniformly() {
        let signer = TokenSigner::new("test_secret_for_expiration");

        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: expiration,
        };
        let expired_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_for_expiration".as_bytes()),
        )
        .unwrap();

        match signer.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, AUTH_FAILURE_MESSAGE),
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected_uniformly() {
        let issuing = TokenSigner::new("one_secret");
        let verifying = TokenSigner::new("a_completely_different_secret");

        let token = issuing.issue(Uuid::new_v4()).unwrap();
        match verifying.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, AUTH_FAILURE_MESSAGE),
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for bad signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected_uniformly() {
        let signer = TokenSigner::new("any_secret");
        match signer.verify("not-even-a-jwt") {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, AUTH_FAILURE_MESSAGE),
            other => panic!("Unexpected result for garbage token: {:?}", other.err()),
        }
    }
}
