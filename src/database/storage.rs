use async_trait::async_trait;
use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewStudent, Student, StudentPatch};

/// Student persistence capabilities. Handlers depend only on this trait.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert one row and return the generated primary key.
    async fn create_student(&self, student: NewStudent) -> Result<i64, DatabaseError>;

    /// Point lookup. `DatabaseError::NotFound` when no row matches.
    async fn get_student_by_id(&self, id: i64) -> Result<Student, DatabaseError>;

    /// Full scan in natural storage order; empty table yields an empty vec.
    async fn get_students(&self) -> Result<Vec<Student>, DatabaseError>;

    /// Delete by id. Zero affected rows is not an error; callers that need
    /// existence semantics look the row up first.
    async fn delete_student(&self, id: i64) -> Result<(), DatabaseError>;

    /// Write only the supplied fields. `DatabaseError::NotFound` when no row matches.
    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Storage handle injected into every handler
pub type SharedStorage = Arc<dyn Storage>;
