use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::validate::{FieldViolation, Validator};
use crate::database::models::{NewStudent, StudentPatch};
use crate::error::ApiError;

/// POST /students body. Every field is optional at the decode stage so that
/// missing fields surface as validation messages rather than decode errors.
#[derive(Debug, Default, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

impl CreateStudentRequest {
    pub fn validate(self) -> Result<NewStudent, Vec<FieldViolation>> {
        Validator::new()
            .text("name", self.name.as_deref())
            .email("email", self.email.as_deref())
            .positive("age", self.age)
            .finish()?;

        Ok(NewStudent {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
        })
    }
}

/// PATCH /students/:id body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

impl UpdateStudentRequest {
    /// Supplied fields follow the create rules; absent fields are left alone.
    pub fn validate(self) -> Result<StudentPatch, Vec<FieldViolation>> {
        let mut validator = Validator::new();
        if self.name.is_some() {
            validator.text("name", self.name.as_deref());
        }
        if self.email.is_some() {
            validator.email("email", self.email.as_deref());
        }
        if self.age.is_some() {
            validator.positive("age", self.age);
        }
        validator.finish()?;

        Ok(StudentPatch {
            name: self.name,
            email: self.email,
            age: self.age,
        })
    }
}

/// Decode a JSON body, keeping "no body at all" apart from malformed JSON.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }

    serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(e.to_string()))
}

/// Path ids must be integers
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|e| ApiError::bad_request(format!("invalid id '{raw}': {e}")))
}
