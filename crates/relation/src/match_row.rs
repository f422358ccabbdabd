//! The parent row a relation view is filtered against.

use core::fmt;
use tether_reactive::TableChange;

/// Which parent row, if any, is current.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchRow {
    /// No parent row is selected; the view is empty.
    #[default]
    NoMatch,
    /// The parent row at this index is selected.
    Matched(usize),
}

impl MatchRow {
    /// Selects `row` if it is a valid index into a parent of `parent_row_count`
    /// rows, and `NoMatch` otherwise (negative values included).
    pub fn select(row: isize, parent_row_count: usize) -> Self {
        match usize::try_from(row) {
            Ok(row) if row < parent_row_count => MatchRow::Matched(row),
            _ => MatchRow::NoMatch,
        }
    }

    /// Returns the selected row.
    #[inline]
    pub fn row(self) -> Option<usize> {
        match self {
            MatchRow::Matched(row) => Some(row),
            MatchRow::NoMatch => None,
        }
    }

    #[inline]
    pub fn is_matched(self) -> bool {
        matches!(self, MatchRow::Matched(_))
    }

    /// Returns the selected row, or -1 for `NoMatch`.
    pub fn to_index(self) -> isize {
        self.row()
            .and_then(|row| isize::try_from(row).ok())
            .unwrap_or(-1)
    }

    /// Drops the selection if it is out of range for `parent_row_count` rows.
    pub fn clamp(self, parent_row_count: usize) -> Self {
        match self {
            MatchRow::Matched(row) if row < parent_row_count => self,
            _ => MatchRow::NoMatch,
        }
    }

    /// Follows the selected row across a change of the parent table.
    ///
    /// Inserted and removed rows shift the selection, and removing the
    /// selected row drops it. Value changes and resets leave it alone.
    pub fn follow(self, change: TableChange) -> Self {
        match (self, change) {
            (MatchRow::NoMatch, _) | (_, TableChange::Reset) => self,
            (MatchRow::Matched(row), change) => change
                .map_row(row)
                .map_or(MatchRow::NoMatch, MatchRow::Matched),
        }
    }
}

impl fmt::Display for MatchRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRow::NoMatch => f.write_str("no match"),
            MatchRow::Matched(row) => write!(f, "row {}", row),
        }
    }
}
