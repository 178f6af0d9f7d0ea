use crate::error::{StoreError, ValidationError};

/// Result of a store or catalog operation
pub type StoreResult<T> = Result<T, StoreError>;

/// Result of validating user input
pub type ValidationResult<T> = Result<T, ValidationError>;
