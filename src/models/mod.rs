pub mod pagination;
pub mod task;
pub mod user;

pub use pagination::{Pagination, DEFAULT_LIMIT};
pub use task::{NewTask, Priority, Task, TaskFilter, TaskInput};
pub use user::{AuthCredentials, NewUser, RegisterRequest, User};
