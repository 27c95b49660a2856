//! Error types.
//!
//! `AppError` is what reaches `main`: a user-facing message plus a process exit
//! code. `MetricsError` is the narrower error raised by the aggregation layer;
//! it converts into `AppError` so `?` composes across layers.
//!
//! Exit codes:
//! - `2`: input/usage problems (missing file, unreadable CSV, bad arguments)
//! - `3`: an aggregation could not be computed (missing column, empty table)
//! - `4`: runtime/terminal failures

use crate::domain::{Field, FieldKind};

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a single aggregation over the booking table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The field was not present in the loaded CSV header.
    MissingColumn(Field),
    /// The field exists but holds the other kind of data.
    WrongKind { field: Field, expected: FieldKind },
    /// A count-based ratio was requested over zero rows.
    EmptyTable,
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::MissingColumn(field) => {
                write!(f, "Missing column `{}` in the bookings table.", field.name())
            }
            MetricsError::WrongKind { field, expected } => write!(
                f,
                "Column `{}` is not {} data.",
                field.name(),
                expected.label()
            ),
            MetricsError::EmptyTable => write!(f, "The bookings table has no rows."),
        }
    }
}

impl std::error::Error for MetricsError {}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        AppError::new(3, err.to_string())
    }
}
