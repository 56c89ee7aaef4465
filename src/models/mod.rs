pub mod consulta;
pub mod user;

use crate::error::ValidationError;

/// Unwraps a mandatory text field. Absent and empty values are both missing.
pub(crate) fn required(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::Required { field }),
    }
}

/// Same rule for fields of a partial update: only a provided value is checked.
pub(crate) fn not_empty(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some("") => Err(ValidationError::Required { field }),
        _ => Ok(()),
    }
}
