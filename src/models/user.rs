use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;
use validator::validate_email;

use crate::auth::password::check_strength;
use crate::error::AppError;
use crate::patch;

/// Fields a `PATCH /users/me` request may touch. Anything else rejects the
/// whole patch.
pub const USER_PATCH_FIELDS: &[&str] = &["name", "email", "password", "age"];

/// A user record as stored in the database.
///
/// The password hash and the avatar never appear in serialized output; the
/// avatar is only reachable through its dedicated endpoint and is not loaded
/// with the rest of the record.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated profile patch. Built from a raw JSON object so that unknown
/// fields can be rejected wholesale instead of being silently dropped.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Plaintext; hashed by the store when the patch is applied.
    pub password: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, AppError> {
        patch::ensure_allowed(body, USER_PATCH_FIELDS)?;

        let mut patch = UserPatch::default();

        if let Some(value) = body.get("name") {
            let name = value
                .as_str()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| AppError::BadRequest("Name must be a non-empty string".into()))?;
            patch.name = Some(name.to_string());
        }

        if let Some(value) = body.get("email") {
            let email = value
                .as_str()
                .map(|email| email.trim().to_lowercase())
                .filter(|email| validate_email(email.as_str()))
                .ok_or_else(|| AppError::BadRequest("Email is invalid".into()))?;
            patch.email = Some(email);
        }

        if let Some(value) = body.get("password") {
            let password = value
                .as_str()
                .ok_or_else(|| AppError::BadRequest("Password must be a string".into()))?;
            check_strength(password).map_err(|err| {
                AppError::BadRequest(
                    err.message
                        .map(|msg| msg.into_owned())
                        .unwrap_or_else(|| "Password is invalid".to_string()),
                )
            })?;
            patch.password = Some(password.to_string());
        }

        if let Some(value) = body.get("age") {
            let age = value
                .as_i64()
                .and_then(|age| i32::try_from(age).ok())
                .filter(|age| *age >= 0)
                .ok_or_else(|| AppError::BadRequest("Age must be a non-negative number".into()))?;
            patch.age = Some(age);
        }

        Ok(patch)
    }
}
