//! Evaluation of a filter against live table rows.

use tether_core::{CaseSensitivity, Value};
use tether_expr::{evaluate, EvalContext, FilterExpr};
use tether_reactive::TableModel;

/// One child row and one parent row, read in place from their tables.
pub(crate) struct RowPair<'a> {
    child: &'a dyn TableModel,
    child_row: usize,
    parent: &'a dyn TableModel,
    parent_row: usize,
}

impl<'a> RowPair<'a> {
    pub(crate) fn new(
        child: &'a dyn TableModel,
        child_row: usize,
        parent: &'a dyn TableModel,
        parent_row: usize,
    ) -> Self {
        Self {
            child,
            child_row,
            parent,
            parent_row,
        }
    }
}

impl EvalContext for RowPair<'_> {
    fn child_value(&self, column: usize) -> Option<&Value> {
        self.child.value(self.child_row, column)
    }

    fn parent_value(&self, column: usize) -> Option<&Value> {
        self.parent.value(self.parent_row, column)
    }
}

/// Returns true if child row `child_row` passes `filter` against parent row
/// `parent_row`.
pub(crate) fn row_matches(
    filter: &FilterExpr,
    child: &dyn TableModel,
    child_row: usize,
    parent: &dyn TableModel,
    parent_row: usize,
    case: CaseSensitivity,
) -> bool {
    evaluate(filter, &RowPair::new(child, child_row, parent, parent_row), case)
}
