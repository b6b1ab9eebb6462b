pub mod list;
pub mod task;
pub mod text;

pub use list::ListCursor;
pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::truncate_with_ellipsis;
