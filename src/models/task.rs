use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::patch;

/// Fields a `PATCH /tasks/{id}` request may touch.
pub const TASK_PATCH_FIELDS: &[&str] = &["description", "completed"];

/// A task record as stored in the database and returned by the API.
///
/// The owner is never serialized; ownership is an implementation detail the
/// API never discloses.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
///
/// Any client-supplied owner field is ignored at deserialization; the owner is
/// always the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Raw query parameters for `GET /tasks`.
///
/// Everything is an `Option<String>` so that malformed values can never fail
/// extraction; they degrade to "parameter absent" in [`TaskFilter::from_query`].
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

/// Sortable task columns. The query parameter names are the camelCase API
/// vocabulary; `column` yields the SQL identifier.
///
/// Sorting needs a column identifier spliced into the SQL text, which cannot be
/// a bind parameter, so the field set is a fixed allow-list. Anything outside
/// it falls back to the creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "description" => SortField::Description,
            "completed" => SortField::Completed,
            _ => SortField::CreatedAt,
        }
    }
}

/// A parsed `sortBy` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: false,
        }
    }
}

impl TaskSort {
    /// Parses a `field_direction` string. The direction is descending only for
    /// the literal `desc`; anything else, including a missing direction, means
    /// ascending.
    fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, '_');
        let field = SortField::parse(parts.next().unwrap_or_default());
        let descending = parts.next() == Some("desc");
        Self { field, descending }
    }
}

/// Store-level filter, sort, and window directives for listing tasks, derived
/// from [`TaskQuery`]. The owner scope is not part of the filter; the store
/// applies it unconditionally.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub sort: TaskSort,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl TaskFilter {
    pub fn from_query(query: &TaskQuery) -> Self {
        Self {
            // Present means filter; only the literal "true" selects completed
            // tasks, every other value selects incomplete ones.
            completed: query.completed.as_deref().map(|value| value == "true"),
            sort: query
                .sort_by
                .as_deref()
                .map(TaskSort::parse)
                .unwrap_or_default(),
            limit: parse_window(query.limit.as_deref()),
            skip: parse_window(query.skip.as_deref()),
        }
    }
}

/// Base-10 parse with graceful degradation: non-numeric or negative input
/// behaves as if the parameter were absent.
fn parse_window(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value >= 0)
}

/// A validated task patch, built from a raw JSON object so unknown fields
/// reject the whole request.
#[derive(Debug, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, AppError> {
        patch::ensure_allowed(body, TASK_PATCH_FIELDS)?;

        let mut patch = TaskPatch::default();

        if let Some(value) = body.get("description") {
            let description = value
                .as_str()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest("Description must be a non-empty string".into())
                })?;
            patch.description = Some(description.to_string());
        }

        if let Some(value) = body.get("completed") {
            let completed = value
                .as_bool()
                .ok_or_else(|| AppError::BadRequest("Completed must be a boolean".into()))?;
            patch.completed = Some(completed);
        }

        Ok(patch)
    }
}
