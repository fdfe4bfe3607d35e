pub mod task;
pub mod user;

pub use task::{CreateTask, Task, TaskFilter, TaskPatch, TaskQuery, TaskSort};
pub use user::{User, UserPatch};
