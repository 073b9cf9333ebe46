use thiserror::Error;

use crate::key::KeyError;
use crate::value::ValueKind;

/// Convenience alias for frame-oriented results.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors propagated by indexers and frame operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("row is missing indexed column '{column}'")]
    MissingColumn { column: String },
    #[error("column '{column}' expected {expected}, found {found}")]
    TypeDrift {
        column: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("joined column '{column}' holds a {found} value instead of a join result")]
    StructuralJoin { column: String, found: ValueKind },
}

impl FrameError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        FrameError::MissingColumn {
            column: column.into(),
        }
    }

    pub fn type_drift(column: impl Into<String>, expected: ValueKind, found: ValueKind) -> Self {
        FrameError::TypeDrift {
            column: column.into(),
            expected,
            found,
        }
    }

    pub fn structural_join(column: impl Into<String>, found: ValueKind) -> Self {
        FrameError::StructuralJoin {
            column: column.into(),
            found,
        }
    }
}
