//! Typed change notifications.
//!
//! A `TableChange` describes one mutation of a table in that table's own row
//! coordinates. Filtered views re-emit the same type in view coordinates.

/// A change to a table or view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableChange {
    /// `count` rows now occupy `[pos, pos + count)`; rows previously at or after
    /// `pos` moved down by `count`.
    RowsInserted { pos: usize, count: usize },
    /// The rows previously at `[pos, pos + count)` are gone; rows after them
    /// moved up by `count`.
    RowsRemoved { pos: usize, count: usize },
    /// The cell at `(row, column)` holds a new value.
    ValueChanged { row: usize, column: usize },
    /// Anything may have changed, including the column count.
    Reset,
}

impl TableChange {
    /// Returns true if this change alters the row layout.
    #[inline]
    pub fn is_structural(&self) -> bool {
        !matches!(self, TableChange::ValueChanged { .. })
    }

    /// Maps a row index valid before this change to its index after it.
    ///
    /// Returns `None` if the row was removed, or if the change is a reset and
    /// row identity is lost.
    pub fn map_row(&self, row: usize) -> Option<usize> {
        match *self {
            TableChange::RowsInserted { pos, count } if row >= pos => Some(row + count),
            TableChange::RowsRemoved { pos, count } if row >= pos => {
                if row < pos + count {
                    None
                } else {
                    Some(row - count)
                }
            }
            TableChange::Reset => None,
            _ => Some(row),
        }
    }
}
