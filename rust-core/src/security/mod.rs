/// Input validation for queries and collaborator paths

pub mod validation;

pub use validation::{sanitize_path, validate_query, ValidationError};
