use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewStudent, Student, StudentPatch};
use crate::database::storage::Storage;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    email TEXT,
    age INTEGER
)";

/// SQLite-backed student store
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open the configured database file and ensure the schema exists.
    /// Safe to call on every start.
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect(&config.storage_path, &config.database).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        DatabaseManager::close(&self.pool).await;
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_student(&self, student: NewStudent) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(&student.name)
            .bind(&student.email)
            .bind(student.age)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Student, DatabaseError> {
        sqlx::query_as::<_, Student>(
            "SELECT id, name, email, age FROM students WHERE id = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NotFound(id))
    }

    async fn get_students(&self) -> Result<Vec<Student>, DatabaseError> {
        let students = sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students")
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }

    async fn delete_student(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id, count = result.rows_affected(), "Records deleted");
        Ok(())
    }

    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<(), DatabaseError> {
        if patch.is_empty() {
            // nothing to write, but the row must still exist
            self.get_student_by_id(id).await?;
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE students SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(email) = patch.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(age) = patch.age {
            fields.push("age = ").push_bind_unseparated(age);
        }
        builder.push(" WHERE id = ").push_bind(id);

        debug!(sql = builder.sql(), "Updating student");
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(id));
        }

        info!(id, count = result.rows_affected(), "Records updated");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use std::collections::HashSet;
    use tempfile::TempDir;

    async fn open() -> (TempDir, SqliteStorage) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            max_connections: 2,
            connection_timeout: 5,
        };
        let pool = DatabaseManager::connect(&dir.path().join("students.db"), &config)
            .await
            .unwrap();
        let storage = SqliteStorage::from_pool(pool).await.unwrap();
        (dir, storage)
    }

    fn ann() -> NewStudent {
        NewStudent {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            age: 30,
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let (_dir, storage) = open().await;

        let mut last = 0;
        for _ in 0..5 {
            let id = storage.create_student(ann()).await.unwrap();
            assert!(id > last, "id {id} should be greater than {last}");
            last = id;
        }
    }

    #[tokio::test]
    async fn read_back_matches_input() {
        let (_dir, storage) = open().await;
        let id = storage.create_student(ann()).await.unwrap();

        let student = storage.get_student_by_id(id).await.unwrap();
        assert_eq!(
            student,
            Student {
                id,
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                age: 30,
            }
        );
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let (_dir, storage) = open().await;
        let err = storage.get_student_by_id(42).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(42)));
    }

    #[tokio::test]
    async fn list_is_empty_then_contains_every_created_row() {
        let (_dir, storage) = open().await;
        assert!(storage.get_students().await.unwrap().is_empty());

        let mut created = HashSet::new();
        for i in 0..4 {
            let id = storage
                .create_student(NewStudent {
                    name: format!("student-{i}"),
                    email: format!("s{i}@school.org"),
                    age: 18 + i,
                })
                .await
                .unwrap();
            created.insert(id);
        }

        let listed: HashSet<i64> = storage
            .get_students()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn delete_removes_row_and_tolerates_missing_ids() {
        let (_dir, storage) = open().await;
        let id = storage.create_student(ann()).await.unwrap();

        storage.delete_student(id).await.unwrap();
        assert!(storage.get_student_by_id(id).await.unwrap_err().is_not_found());

        // second delete affects zero rows and still succeeds
        storage.delete_student(id).await.unwrap();
    }

    #[tokio::test]
    async fn update_writes_only_supplied_fields() {
        let (_dir, storage) = open().await;
        let id = storage.create_student(ann()).await.unwrap();

        storage
            .update_student(
                id,
                StudentPatch {
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let student = storage.get_student_by_id(id).await.unwrap();
        assert_eq!(student.age, 31);
        assert_eq!(student.name, "Ann");
        assert_eq!(student.email, "ann@x.com");
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let (_dir, storage) = open().await;
        let patch = StudentPatch {
            name: Some("Bob".to_string()),
            ..Default::default()
        };
        assert!(storage.update_student(9, patch).await.unwrap_err().is_not_found());
        assert!(storage
            .update_student(9, StudentPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let (_dir, storage) = open().await;
        let id = storage.create_student(ann()).await.unwrap();

        let reopened = SqliteStorage::from_pool(storage.pool().clone()).await.unwrap();
        assert_eq!(reopened.get_student_by_id(id).await.unwrap().name, "Ann");
    }
}
