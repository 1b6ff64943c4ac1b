pub mod students;
pub mod system;
