use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension, Path},
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{decode_json, parse_id, CreateStudentRequest, UpdateStudentRequest};
use crate::database::{SharedStorage, Student};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /students - Create a student, respond 201 with the generated id
pub async fn create(
    Extension(storage): Extension<SharedStorage>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Value> {
    info!("Creating student");

    let body = body?;
    let request: CreateStudentRequest = decode_json(&body)?;
    let student = request.validate()?;

    let id = storage.create_student(student).await?;
    info!(id, "Student created");

    Ok(ApiResponse::created(json!({ "id": id })))
}

/// GET /students/:id - Get a single student
pub async fn get(Extension(storage): Extension<SharedStorage>, Path(id): Path<String>) -> ApiResult<Student> {
    info!(id = %id, "Getting student by id");
    let id = parse_id(&id)?;

    let student = storage.get_student_by_id(id).await.map_err(|e| {
        error!(id, "Error getting student: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(student))
}

/// GET /students - List every student
pub async fn list(Extension(storage): Extension<SharedStorage>) -> ApiResult<Vec<Student>> {
    info!("Getting all students");
    let students = storage.get_students().await?;
    Ok(ApiResponse::success(students))
}

/// PATCH /students/:id - Change the supplied fields, respond with the updated student
pub async fn update(
    Extension(storage): Extension<SharedStorage>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Student> {
    info!(id = %id, "Updating student");
    let id = parse_id(&id)?;
    let body = body?;

    let request: UpdateStudentRequest = decode_json(&body)?;
    let patch = request.validate()?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("no fields to update"));
    }

    storage.update_student(id, patch).await?;
    let student = storage.get_student_by_id(id).await?;

    Ok(ApiResponse::success(student))
}

/// DELETE /students/:id - Delete an existing student
pub async fn delete(Extension(storage): Extension<SharedStorage>, Path(id): Path<String>) -> ApiResult<Value> {
    info!(id = %id, "Deleting student");
    let id = parse_id(&id)?;

    // storage deletes are unconditional; existence is checked here
    storage.get_student_by_id(id).await.map_err(|e| {
        error!(id, "Student not found: {}", e);
        ApiError::from(e)
    })?;

    storage.delete_student(id).await.map_err(|e| {
        error!(id, "Error deleting student: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(json!({ "result": true })))
}
