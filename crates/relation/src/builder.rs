//! Builder for relation filters.

use crate::filter::RelationFilter;
use crate::options::FilterOptions;
use tether_core::{CaseSensitivity, Result};
use tether_expr::{FilterExpr, ForeignKey, PrimaryKey, RelationKey};
use tether_reactive::SharedTable;

/// Builder for creating relation filters.
///
/// Steps may be given in any order; `build` applies them so that the match
/// row is selected last, once the parent table is known.
#[derive(Default)]
pub struct RelationFilterBuilder {
    filter: Option<FilterExpr>,
    key: Option<(PrimaryKey, ForeignKey)>,
    options: FilterOptions,
    child: Option<SharedTable>,
    parent: Option<SharedTable>,
    match_row: Option<isize>,
}

impl RelationFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self.key = None;
        self
    }

    /// Uses the filter `child[fk[i]] == parent[pk[i]]` instead of an expression.
    pub fn relation_key_from_pk_fk(mut self, pk: PrimaryKey, fk: ForeignKey) -> Self {
        self.key = Some((pk, fk));
        self.filter = None;
        self
    }

    pub fn options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.options.case_sensitivity = case_sensitivity;
        self
    }

    pub fn child_table(mut self, table: &SharedTable) -> Self {
        self.child = Some(table.clone());
        self
    }

    pub fn parent_table(mut self, table: &SharedTable) -> Self {
        self.parent = Some(table.clone());
        self
    }

    pub fn match_row(mut self, row: isize) -> Self {
        self.match_row = Some(row);
        self
    }

    /// Creates the filter. Fails if the primary and foreign key cannot be paired.
    pub fn build(self) -> Result<RelationFilter> {
        let filter = match self.key {
            Some((pk, fk)) => RelationKey::from_keys(&pk, &fk)?.to_filter(),
            None => self.filter,
        };
        let view = RelationFilter::new();
        view.set_options(self.options);
        view.set_child_table(self.child.as_ref());
        view.set_parent_table(self.parent.as_ref());
        view.set_filter(filter);
        if let Some(row) = self.match_row {
            view.set_match_row(row);
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tether_expr::{child_column, parent_column};
    use tether_reactive::VariantTable;

    fn tables() -> (SharedTable, SharedTable) {
        let child = SharedTable::new(VariantTable::from_rows(vec![
            vec![11, 1],
            vec![12, 1],
            vec![25, 2],
        ]));
        let parent = SharedTable::new(VariantTable::from_rows(vec![vec![1], vec![2]]));
        (child, parent)
    }

    #[test]
    fn test_builder_empty() {
        let view = RelationFilterBuilder::new().build().unwrap();
        assert!(view.is_null());
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.match_row(), -1);
    }

    #[test]
    fn test_builder_order_independent() {
        let (child, parent) = tables();
        let view = RelationFilterBuilder::new()
            .match_row(1)
            .filter(FilterExpr::eq(child_column(1), parent_column(0)))
            .parent_table(&parent)
            .child_table(&child)
            .build()
            .unwrap();
        assert_eq!(view.match_row(), 1);
        assert_eq!(view.current_child_rows(), vec![2]);
    }

    #[test]
    fn test_builder_pk_fk() {
        let (child, parent) = tables();
        let view = RelationFilterBuilder::new()
            .relation_key_from_pk_fk(PrimaryKey::new([0]), ForeignKey::new([1]))
            .child_table(&child)
            .parent_table(&parent)
            .case_sensitivity(CaseSensitivity::Sensitive)
            .match_row(0)
            .build()
            .unwrap();
        assert_eq!(view.current_child_rows(), vec![0, 1]);
        assert!(view.relation_key_for_equality().contains_column_pair(0, 1));
        assert_eq!(view.options().case_sensitivity, CaseSensitivity::Sensitive);
    }

    #[test]
    fn test_builder_rejects_mismatched_keys() {
        let result = RelationFilterBuilder::new()
            .relation_key_from_pk_fk(PrimaryKey::new([0, 1]), ForeignKey::new([1]))
            .build();
        assert!(result.is_err());
    }
}
