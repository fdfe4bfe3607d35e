pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use extractors::Session;
pub use middleware::AuthGate;
pub use password::{check_strength, hash_password, verify_password};
pub use token::{Claims, TokenSigner};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account. Leading/trailing whitespace is
    /// trimmed before persisting.
    #[validate(length(min = 1))]
    pub name: String,
    /// Email address for the new account. Stored trimmed and lowercased, so
    /// uniqueness is case-insensitive.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. At least 7 characters, must not contain
    /// the substring "password" in any casing.
    #[validate(custom = "crate::auth::password::check_strength")]
    pub password: String,
    /// Age in years, non-negative. Defaults to 0 when omitted.
    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

/// Response body after successful registration or login: the user's public
/// representation plus the freshly issued session token.
#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register_request(email: &str, password: &str, age: Option<i32>) -> RegisterRequest {
        RegisterRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            age,
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "sturdy-secret".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "sturdy-secret".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request("test@example.com", "sturdy-secret", Some(30))
            .validate()
            .is_ok());

        // Age defaults when omitted, so None is valid.
        assert!(register_request("test@example.com", "sturdy-secret", None)
            .validate()
            .is_ok());

        // Invalid email
        assert!(register_request("invalid-email", "sturdy-secret", None)
            .validate()
            .is_err());

        // Too short
        assert!(register_request("test@example.com", "short", None)
            .validate()
            .is_err());

        // Contains the forbidden substring, in mixed case
        assert!(register_request("test@example.com", "MyPassword1", None)
            .validate()
            .is_err());

        // Negative age
        assert!(register_request("test@example.com", "sturdy-secret", Some(-1))
            .validate()
            .is_err());
    }
}
