use crate::error::AppError;
use bcrypt::{hash, verify};
use validator::ValidationError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12) // bcrypt default cost is 12
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Password strength policy, shared by registration and profile updates:
/// at least 7 characters and must not contain the substring "password"
/// in any casing.
pub fn check_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 7 {
        let mut err = ValidationError::new("length");
        err.message = Some("Password must be at least 7 characters long".into());
        return Err(err);
    }
    if password.to_lowercase().contains("password") {
        let mut err = ValidationError::new("forbidden_substring");
        err.message = Some("Password cannot contain \"password\"".into());
        return Err(err);
    }
    Ok(())
}
