//! Credential store: user records and their active session tokens.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{User, UserPatch};

const USER_COLUMNS: &str = "id, name, email, password_hash, age, created_at, updated_at";

/// The pre-write uniqueness check races with concurrent writers; the unique
/// constraint on `email` is the authority. Its violation is a client error,
/// not a server fault.
fn map_unique_email(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("Email already registered".into())
        }
        _ => err.into(),
    }
}

/// Inserts a new user. The plaintext password is hashed here; no caller ever
/// persists it directly.
pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    age: i32,
) -> Result<User, AppError> {
    let password_hash = hash_password(password)?;
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, password_hash, age) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(age)
    .fetch_one(pool)
    .await
    .map_err(map_unique_email)?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Resolves a user by id, but only when `token` is still a member of the
/// user's active-token collection. This is the revocation check the auth gate
/// relies on.
pub async fn find_by_id_and_token(
    pool: &PgPool,
    id: Uuid,
    token: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT u.{} FROM users u \
         INNER JOIN user_tokens t ON t.user_id = u.id \
         WHERE u.id = $1 AND t.token = $2",
        USER_COLUMNS.replace(", ", ", u.")
    ))
    .bind(id)
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(existing.is_some())
}

/// Appends a token to the user's active-token collection.
pub async fn add_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), AppError> {
    sqlx::query("INSERT INTO user_tokens (user_id, token) VALUES ($1, $2)")
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Removes exactly one token; the user's other sessions stay valid.
pub async fn remove_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Clears the active-token collection, invalidating every session at once.
pub async fn clear_tokens(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Applies a validated profile patch to `user` and persists the full record.
///
/// A new plaintext password is hashed here, and only here, so the "hash is
/// recomputed exactly when the plaintext changes" invariant holds for every
/// write path. A changed email is re-checked for uniqueness.
pub async fn apply_patch(pool: &PgPool, user: &User, patch: UserPatch) -> Result<User, AppError> {
    let name = patch.name.unwrap_or_else(|| user.name.clone());
    let email = patch.email.unwrap_or_else(|| user.email.clone());
    let age = patch.age.unwrap_or(user.age);

    if email != user.email && email_taken(pool, &email).await? {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = match patch.password {
        Some(plaintext) => hash_password(&plaintext)?,
        None => user.password_hash.clone(),
    };

    let updated = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET name = $1, email = $2, password_hash = $3, age = $4, updated_at = now() \
         WHERE id = $5 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(age)
    .bind(user.id)
    .fetch_one(pool)
    .await
    .map_err(map_unique_email)?;

    Ok(updated)
}

/// Deletes a user account.
///
/// The cascade to the account's tasks and tokens runs in the same transaction
/// as the user delete, so a partial failure can never strand orphaned rows.
pub async fn delete(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Stores the normalized avatar image for a user.
pub async fn set_avatar(pool: &PgPool, user_id: Uuid, avatar: &[u8]) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET avatar = $1, updated_at = now() WHERE id = $2")
        .bind(avatar)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn clear_avatar(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET avatar = NULL, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Fetches a user's avatar bytes. `None` covers both "no such user" and
/// "user has no avatar"; the route treats them identically.
pub async fn avatar(pool: &PgPool, user_id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
    let row: Option<(Option<Vec<u8>>,)> =
        sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(avatar,)| avatar))
}
