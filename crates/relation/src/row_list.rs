//! Sorted list of the child rows visible through a relation view.
//!
//! `RowList` maps view rows to child table rows. It is rebuilt by a full scan
//! on resets and configuration changes, and patched in place when the child
//! table reports localized changes. Every patch returns the matching change in
//! view coordinates so the caller can forward it.

use alloc::vec::Vec;
use tether_reactive::TableChange;

/// Strictly increasing child row indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowList {
    rows: Vec<usize>,
}

impl RowList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }

    /// Returns the child row shown at `view_row`.
    #[inline]
    pub fn to_source(&self, view_row: usize) -> Option<usize> {
        self.rows.get(view_row).copied()
    }

    /// Returns the view row showing child row `source_row`.
    pub fn to_view(&self, source_row: usize) -> Option<usize> {
        self.rows.binary_search(&source_row).ok()
    }

    #[inline]
    pub fn contains(&self, source_row: usize) -> bool {
        self.to_view(source_row).is_some()
    }

    /// First view position whose child row is `>= source_row`.
    #[inline]
    fn lower_bound(&self, source_row: usize) -> usize {
        self.rows.partition_point(|&r| r < source_row)
    }

    /// Empties the list. Returns true if it was not empty.
    pub fn clear(&mut self) -> bool {
        let changed = !self.rows.is_empty();
        self.rows.clear();
        changed
    }

    /// Rebuilds the list from the `row_count` child rows accepted by `matches`.
    ///
    /// Returns true if the content changed.
    pub fn recompute(&mut self, row_count: usize, mut matches: impl FnMut(usize) -> bool) -> bool {
        let rows: Vec<usize> = (0..row_count).filter(|&r| matches(r)).collect();
        if rows == self.rows {
            return false;
        }
        self.rows = rows;
        true
    }

    /// Accounts for `count` child rows inserted at `pos`.
    ///
    /// Existing entries at or after `pos` move down by `count`; the new rows
    /// accepted by `matches` are added. Returns the view insertion, if any row
    /// was added.
    pub fn on_rows_inserted(
        &mut self,
        pos: usize,
        count: usize,
        mut matches: impl FnMut(usize) -> bool,
    ) -> Option<TableChange> {
        let view_pos = self.lower_bound(pos);
        for row in &mut self.rows[view_pos..] {
            *row += count;
        }
        let added: Vec<usize> = (pos..pos + count).filter(|&r| matches(r)).collect();
        if added.is_empty() {
            return None;
        }
        let added_count = added.len();
        self.rows.splice(view_pos..view_pos, added);
        Some(TableChange::RowsInserted {
            pos: view_pos,
            count: added_count,
        })
    }

    /// Accounts for the child rows `[pos, pos + count)` being removed.
    ///
    /// Returns the view removal, if any listed row was among them.
    pub fn on_rows_removed(&mut self, pos: usize, count: usize) -> Option<TableChange> {
        let start = self.lower_bound(pos);
        let end = self.lower_bound(pos.saturating_add(count));
        self.rows.drain(start..end);
        for row in &mut self.rows[start..] {
            *row -= count;
        }
        if start == end {
            return None;
        }
        Some(TableChange::RowsRemoved {
            pos: start,
            count: end - start,
        })
    }

    /// Accounts for a value change in child row `row`, which now does or does
    /// not `match`.
    ///
    /// A membership flip becomes a single-row view insertion or removal; a row
    /// that stays visible becomes a view value change.
    pub fn on_value_changed(&mut self, row: usize, column: usize, matches: bool) -> Option<TableChange> {
        match (self.rows.binary_search(&row), matches) {
            (Ok(view_row), true) => Some(TableChange::ValueChanged {
                row: view_row,
                column,
            }),
            (Ok(view_row), false) => {
                self.rows.remove(view_row);
                Some(TableChange::RowsRemoved {
                    pos: view_row,
                    count: 1,
                })
            }
            (Err(view_row), true) => {
                self.rows.insert(view_row, row);
                Some(TableChange::RowsInserted {
                    pos: view_row,
                    count: 1,
                })
            }
            (Err(_), false) => None,
        }
    }
}
