/// Task tracking module
///
/// Server-side task records with type-prefixed ids, status/priority tracking,
/// filtered listings, and comment threads.

pub mod storage;
pub mod types;

pub use storage::TaskStorage;
pub use types::{
    CreateCommentRequest, CreateTaskRequest, Task, TaskComment, TaskListParams, TaskPriority,
    TaskQuery, TaskStatus, TaskSummary, TaskType, UpdateTaskRequest,
};
