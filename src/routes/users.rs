use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use futures::TryStreamExt;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{verify_password, AuthResponse, LoginRequest, RegisterRequest, Session, TokenSigner},
    email::Mailer,
    error::AppError,
    media,
    models::UserPatch,
    store,
};

/// Upload ceiling for avatar images, in bytes.
const MAX_AVATAR_BYTES: usize = 1_000_000;
const AVATAR_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Register a new user.
///
/// Creates the account, fires a best-effort welcome email, and issues the
/// first session token.
///
/// ## Responses:
/// - `201 Created`: `{user, token}`.
/// - `400 Bad Request`: validation failure or email already registered.
#[post("/users")]
pub async fn register(
    pool: web::Data<PgPool>,
    signer: web::Data<TokenSigner>,
    mailer: web::Data<Mailer>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();
    let age = body.age.unwrap_or(0);

    if store::users::email_taken(&pool, &email).await? {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let user = store::users::create(&pool, name, &email, &body.password, age).await?;

    // Fire-and-forget; delivery failure never fails the registration.
    mailer.send_welcome(&user.email, &user.name);

    let token = signer.issue(user.id)?;
    store::users::add_token(&pool, user.id, &token).await?;

    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Log in with email and password.
///
/// An unknown email and a wrong password produce the same generic 400, so the
/// endpoint cannot be used to enumerate accounts.
#[post("/users/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    signer: web::Data<TokenSigner>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let email = body.email.trim().to_lowercase();

    let user = store::users::find_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unable to login".into()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Unable to login".into()));
    }

    let token = signer.issue(user.id)?;
    store::users::add_token(&pool, user.id, &token).await?;

    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// Log out the current session only; other issued tokens stay valid.
#[post("/users/logout")]
pub async fn logout(pool: web::Data<PgPool>, session: Session) -> Result<impl Responder, AppError> {
    store::users::remove_token(&pool, session.user.id, &session.token).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Log out every session by clearing the active-token collection.
#[post("/users/logoutAll")]
pub async fn logout_all(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<impl Responder, AppError> {
    store::users::clear_tokens(&pool, session.user.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Returns the authenticated user's profile.
#[get("/users/me")]
pub async fn me(session: Session) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(session.user))
}

/// Updates the authenticated user's profile.
///
/// Only `name`, `email`, `password`, and `age` may be submitted; any other
/// field rejects the entire patch with 400 and nothing is applied.
#[patch("/users/me")]
pub async fn update_me(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<Map<String, Value>>,
) -> Result<impl Responder, AppError> {
    let patch = UserPatch::from_body(&body)?;
    let updated = store::users::apply_patch(&pool, &session.user, patch).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes the authenticated user's account.
///
/// The account's tasks and tokens go with it, then a best-effort farewell
/// email is sent.
#[delete("/users/me")]
pub async fn delete_me(
    pool: web::Data<PgPool>,
    mailer: web::Data<Mailer>,
    session: Session,
) -> Result<impl Responder, AppError> {
    store::users::delete(&pool, session.user.id).await?;

    mailer.send_farewell(&session.user.email, &session.user.name);

    Ok(HttpResponse::Ok().json(session.user))
}

/// Sets the authenticated user's avatar from a multipart `avatar` file field.
///
/// Accepts jpg/jpeg/png up to 1,000,000 bytes; the image is normalized to a
/// fixed square PNG before storage.
#[post("/users/me/avatar")]
pub async fn upload_avatar(
    pool: web::Data<PgPool>,
    session: Session,
    payload: Multipart,
) -> Result<impl Responder, AppError> {
    let bytes = read_avatar_field(payload).await?;

    // Image decoding is CPU-bound; keep it off the async worker.
    let normalized = web::block(move || media::normalize_avatar(&bytes))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Blocking task failed: {}", e)))??;

    store::users::set_avatar(&pool, session.user.id, &normalized).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Clears the authenticated user's avatar.
#[delete("/users/me/avatar")]
pub async fn delete_avatar(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<impl Responder, AppError> {
    store::users::clear_avatar(&pool, session.user.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Serves a user's avatar publicly as `image/png`.
///
/// An unknown id, a non-UUID id, and a user without an avatar all answer 404.
#[get("/users/{id}/avatar")]
pub async fn show_avatar(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user_id = Uuid::parse_str(&path)
        .map_err(|_| AppError::NotFound("User not found".into()))?;

    match store::users::avatar(&pool, user_id).await? {
        Some(bytes) => Ok(HttpResponse::Ok().content_type("image/png").body(bytes)),
        None => Err(AppError::NotFound("Avatar not found".into())),
    }
}

/// Pulls the `avatar` file field out of a multipart payload, enforcing the
/// extension allow-list and the size ceiling while streaming.
async fn read_avatar_field(mut payload: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| AppError::BadRequest("Malformed multipart payload".into()))?
    {
        if field.name() != "avatar" {
            // Unrelated fields must still be drained before the next one can
            // be read.
            while let Ok(Some(_)) = field.try_next().await {}
            continue;
        }

        let extension_allowed = field
            .content_disposition()
            .get_filename()
            .and_then(|name| name.rsplit('.').next())
            .map(|ext| AVATAR_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !extension_allowed {
            return Err(AppError::BadRequest(
                "Please upload an image in .jpg, .jpeg, .png format".into(),
            ));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| AppError::BadRequest("Malformed multipart payload".into()))?
        {
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(AppError::BadRequest(format!(
                    "Image must not exceed {} bytes",
                    MAX_AVATAR_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Avatar file is empty".into()));
        }
        return Ok(bytes);
    }

    Err(AppError::BadRequest("Avatar file is required".into()))
}
