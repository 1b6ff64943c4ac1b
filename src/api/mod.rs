pub mod request;
pub mod validate;

pub use request::{decode_json, parse_id, CreateStudentRequest, UpdateStudentRequest};
pub use validate::{join_violations, FieldViolation, Rule};
