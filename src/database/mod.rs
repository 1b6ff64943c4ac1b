pub mod manager;
pub mod models;
pub mod sqlite;
pub mod storage;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{NewStudent, Student, StudentPatch};
pub use sqlite::SqliteStorage;
pub use storage::{SharedStorage, Storage};
