//! Error types for Tether table and view operations.

use alloc::string::String;
use core::fmt;

/// Result type alias for Tether operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Which side of a parent/child relation a table plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableRole {
    /// The table that holds the currently selected row.
    Parent,
    /// The table whose rows are filtered against the parent row.
    Child,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Parent => f.write_str("parent"),
            TableRole::Child => f.write_str("child"),
        }
    }
}

/// Error types for table and view operations.
///
/// Configuration problems (missing filter, out-of-range key columns) are never
/// reported through this type; they degrade to an empty view instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Row index past the end of a table or view.
    RowOutOfRange {
        row: usize,
        row_count: usize,
    },
    /// Column index past the end of a table.
    ColumnOutOfRange {
        column: usize,
        column_count: usize,
    },
    /// A write was requested but no table is attached for this role.
    TableNotAttached {
        role: TableRole,
    },
    /// Primary and foreign key cannot be paired.
    InvalidKey {
        message: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RowOutOfRange { row, row_count } => {
                write!(f, "Row {} out of range (row count: {})", row, row_count)
            }
            Error::ColumnOutOfRange {
                column,
                column_count,
            } => {
                write!(
                    f,
                    "Column {} out of range (column count: {})",
                    column, column_count
                )
            }
            Error::TableNotAttached { role } => {
                write!(f, "No {} table attached", role)
            }
            Error::InvalidKey { message } => {
                write!(f, "Invalid key: {}", message)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates a row out of range error.
    pub fn row_out_of_range(row: usize, row_count: usize) -> Self {
        Error::RowOutOfRange { row, row_count }
    }

    /// Creates a column out of range error.
    pub fn column_out_of_range(column: usize, column_count: usize) -> Self {
        Error::ColumnOutOfRange {
            column,
            column_count,
        }
    }

    /// Creates a table not attached error.
    pub fn table_not_attached(role: TableRole) -> Self {
        Error::TableNotAttached { role }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::row_out_of_range(5, 3);
        assert_eq!(err.to_string(), "Row 5 out of range (row count: 3)");

        let err = Error::column_out_of_range(4, 2);
        assert!(err.to_string().contains("Column 4"));

        let err = Error::table_not_attached(TableRole::Child);
        assert_eq!(err.to_string(), "No child table attached");
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::invalid_key("pk has 2 columns, fk has 1");
        match err {
            Error::InvalidKey { message } => assert!(message.contains("pk")),
            _ => panic!("Wrong error type"),
        }
        assert_eq!(
            Error::invalid_operation("x"),
            Error::InvalidOperation { message: "x".into() }
        );
    }
}
