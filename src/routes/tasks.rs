use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::Session,
    error::AppError,
    models::{CreateTask, TaskFilter, TaskPatch, TaskQuery},
    store,
};

/// Creates a task owned by the authenticated user.
///
/// The owner is taken from the session; any owner field in the body is
/// ignored.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: blank description.
#[post("/tasks")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<CreateTask>,
) -> Result<impl Responder, AppError> {
    let description = body.description.trim();
    if description.is_empty() {
        return Err(AppError::BadRequest("Description is required".into()));
    }

    let task = store::tasks::create(&pool, session.user.id, description, body.completed).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Lists the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` keeps completed tasks, anything else keeps
///   incomplete ones; absent returns both.
/// - `sortBy` (optional): `field_direction`, e.g. `createdAt_desc`. Direction
///   `desc` sorts descending; anything else ascending.
/// - `limit`, `skip` (optional): result window; non-numeric values behave as
///   if absent.
///
/// No matches yields an empty array, never an error.
#[get("/tasks")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let filter = TaskFilter::from_query(&query);
    let tasks = store::tasks::list(&pool, session.user.id, &filter).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves one of the authenticated user's tasks.
///
/// A task owned by another user answers 404, indistinguishable from a task
/// that does not exist.
#[get("/tasks/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;

    let task = store::tasks::find(&pool, session.user.id, task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates one of the authenticated user's tasks.
///
/// Only `description` and `completed` may be submitted; any other field
/// rejects the entire patch with 400 and nothing is applied.
#[patch("/tasks/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;
    let task_patch = TaskPatch::from_body(&body)?;

    let task = store::tasks::update(&pool, session.user.id, task_id, &task_patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the authenticated user's tasks, returning the deleted
/// record.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&path)?;

    let task = store::tasks::delete(&pool, session.user.id, task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// A path segment that is not a UUID can never name an existing task, so it
/// answers 404 like any other miss, not 400.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Task not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id_maps_garbage_to_not_found() {
        assert!(parse_task_id("123e4567-e89b-12d3-a456-426614174000").is_ok());

        match parse_task_id("not-a-uuid") {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }
}
