//! Writes that keep child key columns equal to the current parent key.
//!
//! Both planners only read; the engine applies the returned writes one at a
//! time so that each child notification is handled before the next write.

use alloc::vec::Vec;
use tether_core::Value;
use tether_expr::RelationKey;
use tether_reactive::TableModel;

/// A single child cell write.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KeyWrite {
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) value: Value,
}

/// Plans the writes copying every key value of parent row `parent_row` into
/// child row `child_row`.
///
/// Key columns the parent does not have are skipped.
pub(crate) fn plan_key_copy(
    key: &RelationKey,
    parent: &dyn TableModel,
    parent_row: usize,
    child_row: usize,
) -> Vec<KeyWrite> {
    key.iter()
        .filter_map(|pair| {
            let value = parent.value(parent_row, pair.parent_column())?;
            Some(KeyWrite {
                row: child_row,
                column: pair.child_column(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Plans the writes dragging `rows` along after `parent_column` of parent row
/// `parent_row` changed.
///
/// Returns nothing if `parent_column` is not part of `key`.
pub(crate) fn plan_cascade(
    key: &RelationKey,
    parent_column: usize,
    parent: &dyn TableModel,
    parent_row: usize,
    rows: &[usize],
) -> Vec<KeyWrite> {
    let (Some(column), Some(value)) = (
        key.child_column_for(parent_column),
        parent.value(parent_row, parent_column),
    ) else {
        return Vec::new();
    };
    rows.iter()
        .map(|&row| KeyWrite {
            row,
            column,
            value: value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tether_expr::{ForeignKey, PrimaryKey};
    use tether_reactive::VariantTable;

    fn two_column_key() -> RelationKey {
        RelationKey::from_keys(&PrimaryKey::new([0, 1]), &ForeignKey::new([2, 3])).unwrap()
    }

    #[test]
    fn test_plan_key_copy() {
        let parent = VariantTable::from_rows(vec![vec![Value::from(7), Value::from("x")]]);
        let writes = plan_key_copy(&two_column_key(), &parent, 0, 5);
        assert_eq!(
            writes,
            vec![
                KeyWrite { row: 5, column: 2, value: Value::Int64(7) },
                KeyWrite { row: 5, column: 3, value: Value::from("x") },
            ]
        );
    }

    #[test]
    fn test_plan_key_copy_skips_missing_parent_cells() {
        let parent = VariantTable::from_rows(vec![vec![7]]);
        let writes = plan_key_copy(&two_column_key(), &parent, 0, 0);
        assert_eq!(writes.len(), 1);
        assert!(plan_key_copy(&two_column_key(), &parent, 1, 0).is_empty());
        assert!(plan_key_copy(&RelationKey::new(), &parent, 0, 0).is_empty());
    }

    #[test]
    fn test_plan_cascade() {
        let parent = VariantTable::from_rows(vec![vec![1, 10], vec![3, 30]]);
        let writes = plan_cascade(&two_column_key(), 1, &parent, 1, &[0, 4]);
        assert_eq!(
            writes,
            vec![
                KeyWrite { row: 0, column: 3, value: Value::Int64(30) },
                KeyWrite { row: 4, column: 3, value: Value::Int64(30) },
            ]
        );
    }

    #[test]
    fn test_plan_cascade_ignores_non_key_columns() {
        let parent = VariantTable::from_rows(vec![vec![1, 10, 100]]);
        assert!(plan_cascade(&two_column_key(), 2, &parent, 0, &[0]).is_empty());
        assert!(plan_cascade(&two_column_key(), 0, &parent, 1, &[0]).is_empty());
    }
}
