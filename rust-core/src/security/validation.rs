/// Query validation and path confinement

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Query too long: max {max} characters, got {actual}")]
    InputTooLong { max: usize, actual: usize },

    #[error("Invalid characters detected")]
    InvalidCharacters,

    #[error("Path escapes its directory or does not exist: {0}")]
    PathTraversal(String),

    #[error("Empty query not allowed")]
    EmptyInput,
}

/// Validate a user query before routing
pub fn validate_query(input: &str, max_length: usize) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let length = input.chars().count();
    if length > max_length {
        return Err(ValidationError::InputTooLong {
            max: max_length,
            actual: length,
        });
    }

    // Control characters other than newline, tab, carriage return
    if input.chars().any(|c| {
        c.is_control() && c != '\n' && c != '\t' && c != '\r'
    }) {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(())
}

/// Resolve `user_path` under `base_path`, refusing anything that lands outside it
pub fn sanitize_path(base_path: &Path, user_path: &str) -> Result<PathBuf, ValidationError> {
    if user_path.contains('\0') {
        return Err(ValidationError::InvalidCharacters);
    }

    let resolved = base_path.join(user_path);

    // Canonicalize to resolve any ".." components and symlinks
    let canonical = resolved.canonicalize()
        .map_err(|_| ValidationError::PathTraversal(user_path.to_string()))?;

    let base_canonical = base_path.canonicalize()
        .map_err(|_| ValidationError::PathTraversal(user_path.to_string()))?;

    if !canonical.starts_with(&base_canonical) {
        return Err(ValidationError::PathTraversal(user_path.to_string()));
    }

    Ok(canonical)
}
