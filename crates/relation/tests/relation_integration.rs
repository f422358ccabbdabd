//! Integration tests for relation views over live tables.
//!
//! Child rows are `(id, parent_id)`, parent rows are `(id)` unless stated
//! otherwise.

use std::cell::RefCell;
use std::rc::Rc;
use tether_core::{CaseSensitivity, Error, TableRole, Value};
use tether_expr::{child_column, literal, parent_column, FilterExpr, ForeignKey, PrimaryKey};
use tether_reactive::{SharedTable, TableChange, VariantTable};
use tether_relation::{MatchRow, RelationFilter, RelationFilterBuilder};

fn child_table() -> SharedTable {
    SharedTable::new(VariantTable::from_rows(vec![
        vec![11, 1],
        vec![12, 1],
        vec![25, 2],
    ]))
}

fn parent_table() -> SharedTable {
    SharedTable::new(VariantTable::from_rows(vec![vec![1], vec![2]]))
}

fn by_parent_id() -> FilterExpr {
    FilterExpr::eq(child_column(1), parent_column(0))
}

fn view_of(child: &SharedTable, parent: &SharedTable) -> RelationFilter {
    RelationFilterBuilder::new()
        .filter(by_parent_id())
        .child_table(child)
        .parent_table(parent)
        .build()
        .unwrap()
}

/// Returns the visible rows as `(id, parent_id)`.
fn visible(view: &RelationFilter) -> Vec<(i64, i64)> {
    (0..view.row_count())
        .map(|r| {
            let id = view.data(r, 0).and_then(|v| v.as_i64()).unwrap_or(-1);
            let parent_id = view.data(r, 1).and_then(|v| v.as_i64()).unwrap_or(-1);
            (id, parent_id)
        })
        .collect()
}

fn record(view: &RelationFilter) -> Rc<RefCell<Vec<TableChange>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    view.subscribe(move |change| sink.borrow_mut().push(*change));
    log
}

// ==================== Master/detail basics ====================

#[test]
fn test_select_parent_rows() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);

    view.set_match_row(0);
    assert_eq!(visible(&view), vec![(11, 1), (12, 1)]);

    view.set_match_row(1);
    assert_eq!(visible(&view), vec![(25, 2)]);

    view.set_match_row(-1);
    assert_eq!(view.row_count(), 0);
    assert!(visible(&view).is_empty());
}

#[test]
fn test_parent_key_edit_cascades() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    parent.set_value(1, 0, Value::Int64(3)).unwrap();

    assert_eq!(child.value(2, 1), Some(Value::Int64(3)));
    assert_eq!(view.match_row(), 1);
    assert_eq!(visible(&view), vec![(25, 3)]);
    // Rows of other parents are untouched
    assert_eq!(child.value(0, 1), Some(Value::Int64(1)));
}

#[test]
fn test_insert_through_view_prefills_key() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    view.insert_row(0).unwrap();

    assert_eq!(view.row_count(), 2);
    assert_eq!(view.data(0, 1), Some(Value::Int64(2)));
    assert_eq!(view.data(0, 0), Some(Value::Null));
    assert_eq!(child.row_count(), 4);
    // Inserted before the row it was shown in front of
    assert_eq!(view.current_child_rows(), vec![2, 3]);
}

#[test]
fn test_shrinking_child_columns_empties_view() {
    // (id, key0, key1) against parent (key0, key1)
    let child = SharedTable::new(VariantTable::from_rows(vec![
        vec![1, 10, 20],
        vec![2, 10, 21],
        vec![3, 10, 20],
    ]));
    let parent = SharedTable::new(VariantTable::from_rows(vec![vec![10, 20]]));
    let view = RelationFilterBuilder::new()
        .relation_key_from_pk_fk(PrimaryKey::new([0, 1]), ForeignKey::new([1, 2]))
        .child_table(&child)
        .parent_table(&parent)
        .match_row(0)
        .build()
        .unwrap();
    assert_eq!(view.relation_key_for_equality().column_pair_count(), 2);
    assert_eq!(view.current_child_rows(), vec![0, 2]);

    let log = record(&view);
    child.reset_with(|t: &mut VariantTable| t.resize(3, 2));

    assert_eq!(view.row_count(), 0);
    assert_eq!(view.column_count(), 2);
    assert_eq!(view.data(0, 0), None);
    assert_eq!(*log.borrow(), vec![TableChange::Reset]);

    // Edits while degraded do not fail
    child.set_value(0, 1, Value::Int64(10)).unwrap();
    child.insert_rows(0, 1).unwrap();
    assert_eq!(view.row_count(), 0);
}

// ==================== Properties ====================

#[test]
fn test_set_match_row_is_idempotent() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    let log = record(&view);

    view.set_match_row(0);
    let rows = view.current_child_rows();
    view.set_match_row(0);

    assert_eq!(view.current_child_rows(), rows);
    assert_eq!(*log.borrow(), vec![TableChange::Reset]);
}

#[test]
fn test_insert_round_trip_every_position() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    for pos in [0, 1, 3, 2] {
        view.insert_row(pos).unwrap();
        assert_eq!(view.data(pos, 1), parent.value(0, 0));
        assert_eq!(view.data(pos, 0), Some(Value::Null));
    }
    assert_eq!(view.row_count(), 6);
}

#[test]
fn test_cascade_keeps_every_visible_row() {
    let child = SharedTable::new(VariantTable::from_rows(vec![
        vec![1, 5],
        vec![2, 7],
        vec![3, 5],
        vec![4, 5],
    ]));
    let parent = SharedTable::new(VariantTable::from_rows(vec![vec![7], vec![5]]));
    let view = view_of(&child, &parent);
    view.set_match_row(1);
    let before = view.current_child_rows();
    assert_eq!(before, vec![0, 2, 3]);

    parent.set_value(1, 0, Value::from("five")).unwrap();

    for &row in &before {
        assert_eq!(child.value(row, 1), Some(Value::from("five")));
    }
    assert_eq!(view.current_child_rows(), before);
    assert_eq!(child.value(1, 1), Some(Value::Int64(7)));
}

#[test]
fn test_cascade_picks_up_rows_already_holding_new_key() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    // Rows of parent 1 move to 2 and join row 25 already there
    parent.set_value(0, 0, Value::Int64(2)).unwrap();

    assert_eq!(visible(&view), vec![(11, 2), (12, 2), (25, 2)]);
    assert_eq!(
        *log.borrow(),
        vec![
            TableChange::ValueChanged { row: 0, column: 1 },
            TableChange::ValueChanged { row: 1, column: 1 },
            TableChange::Reset,
        ]
    );
}

#[test]
fn test_match_row_boundaries() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);

    view.set_match_row(-1);
    assert_eq!(view.row_count(), 0);
    assert_eq!(view.current_match(), MatchRow::NoMatch);

    view.set_match_row(2);
    assert_eq!(view.match_row(), -1);
    assert_eq!(view.row_count(), 0);

    view.set_match_row(isize::MAX);
    assert_eq!(view.match_row(), -1);
}

// ==================== Incremental maintenance ====================

#[test]
fn test_child_inserts_are_patched() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    // New rows are Null until written; they appear once they match
    child.insert_rows(1, 2).unwrap();
    assert_eq!(view.current_child_rows(), vec![0, 3]);
    child.set_value(2, 1, Value::Int64(1)).unwrap();
    assert_eq!(view.current_child_rows(), vec![0, 2, 3]);

    assert_eq!(
        *log.borrow(),
        vec![TableChange::RowsInserted { pos: 1, count: 1 }]
    );
}

#[test]
fn test_child_removals_are_patched() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    child.remove_rows(0, 1).unwrap();
    assert_eq!(visible(&view), vec![(12, 1)]);
    assert_eq!(view.current_child_rows(), vec![0]);

    // Removing rows outside the view only shifts it
    child.remove_rows(1, 1).unwrap();
    assert_eq!(view.current_child_rows(), vec![0]);

    assert_eq!(
        *log.borrow(),
        vec![TableChange::RowsRemoved { pos: 0, count: 1 }]
    );
}

#[test]
fn test_child_edits_flip_membership() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    child.set_value(2, 1, Value::Int64(1)).unwrap();
    child.set_value(0, 1, Value::Int64(2)).unwrap();
    child.set_value(1, 0, Value::Int64(99)).unwrap();
    child.set_value(0, 0, Value::Int64(98)).unwrap();

    assert_eq!(visible(&view), vec![(99, 1), (25, 1)]);
    assert_eq!(
        *log.borrow(),
        vec![
            TableChange::RowsInserted { pos: 2, count: 1 },
            TableChange::RowsRemoved { pos: 0, count: 1 },
            TableChange::ValueChanged { row: 0, column: 0 },
        ]
    );
}

#[test]
fn test_child_reset_recomputes() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    child.reset_with(|t: &mut VariantTable| {
        t.populate_column(1, [2, 2, 1]).unwrap();
    });
    assert_eq!(visible(&view), vec![(11, 2), (12, 2)]);
}

#[test]
fn test_parent_structure_moves_match_row() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);
    let log = record(&view);

    parent.insert_rows(0, 2).unwrap();
    assert_eq!(view.match_row(), 3);
    parent.remove_rows(1, 1).unwrap();
    assert_eq!(view.match_row(), 2);
    assert_eq!(visible(&view), vec![(25, 2)]);
    assert!(log.borrow().is_empty());

    parent.remove_rows(2, 1).unwrap();
    assert_eq!(view.match_row(), -1);
    assert_eq!(view.row_count(), 0);
    assert_eq!(*log.borrow(), vec![TableChange::Reset]);
}

#[test]
fn test_parent_reset_clamps_match_row() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    parent.reset_with(|t: &mut VariantTable| t.resize(1, 1));
    assert_eq!(view.match_row(), -1);
    assert_eq!(view.row_count(), 0);

    view.set_match_row(0);
    parent.reset_with(|t: &mut VariantTable| t.populate_column(0, [2]).unwrap());
    assert_eq!(view.match_row(), 0);
    assert_eq!(visible(&view), vec![(25, 2)]);
}

#[test]
fn test_parent_edits_elsewhere_are_ignored() {
    // Parent rows are (id, name)
    let child = child_table();
    let parent = SharedTable::new(VariantTable::from_rows(vec![
        vec![Value::from(1), Value::from("one")],
        vec![Value::from(2), Value::from("two")],
    ]));
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    parent.set_value(1, 0, Value::Int64(1)).unwrap();
    parent.set_value(0, 1, Value::from("uno")).unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(child.value(2, 1), Some(Value::Int64(2)));
    assert_eq!(view.current_child_rows(), vec![0, 1]);
}

#[test]
fn test_parent_edit_of_non_key_column_recomputes() {
    // Children of the parent with an id below the parent's limit
    let child = child_table();
    let parent = SharedTable::new(VariantTable::from_rows(vec![vec![1, 12], vec![2, 30]]));
    let filter = by_parent_id().and(FilterExpr::lt(child_column(0), parent_column(1)));
    let view = RelationFilterBuilder::new()
        .filter(filter)
        .child_table(&child)
        .parent_table(&parent)
        .match_row(0)
        .build()
        .unwrap();
    assert_eq!(visible(&view), vec![(11, 1)]);

    parent.set_value(0, 1, Value::Int64(13)).unwrap();
    assert_eq!(visible(&view), vec![(11, 1), (12, 1)]);
    // No cascade into the child table
    assert_eq!(child.value(1, 1), Some(Value::Int64(1)));
}

// ==================== Writes through the view ====================

#[test]
fn test_insert_with_no_match_is_invisible() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    assert!(!view.can_insert());

    view.insert_row(0).unwrap();
    assert_eq!(child.row_count(), 4);
    assert_eq!(child.value(3, 1), Some(Value::Null));
    assert_eq!(view.row_count(), 0);
}

#[test]
fn test_insert_out_of_range() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);
    assert!(view.can_insert());

    assert_eq!(view.insert_row(2), Err(Error::row_out_of_range(2, 1)));
    assert_eq!(child.row_count(), 3);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "no child table")]
fn test_insert_without_child_table_panics_in_debug() {
    let parent = parent_table();
    let view = RelationFilterBuilder::new()
        .filter(by_parent_id())
        .parent_table(&parent)
        .build()
        .unwrap();
    let _ = view.insert_row(0);
}

#[test]
fn test_remove_through_view() {
    let child = SharedTable::new(VariantTable::from_rows(vec![
        vec![1, 1],
        vec![2, 2],
        vec![3, 1],
        vec![4, 1],
        vec![5, 1],
    ]));
    let parent = parent_table();
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    let log = record(&view);

    view.remove_row(0).unwrap();
    assert_eq!(visible(&view), vec![(3, 1), (4, 1), (5, 1)]);

    view.remove_rows(1, 2).unwrap();
    assert_eq!(visible(&view), vec![(3, 1)]);
    assert_eq!(child.row_count(), 2);

    assert_eq!(view.remove_rows(1, 1), Err(Error::row_out_of_range(1, 1)));
    assert_eq!(
        *log.borrow(),
        vec![
            TableChange::RowsRemoved { pos: 0, count: 1 },
            TableChange::RowsRemoved { pos: 2, count: 1 },
            TableChange::RowsRemoved { pos: 1, count: 1 },
        ]
    );
}

#[test]
fn test_set_data_through_view() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    view.set_data(1, 0, Value::Int64(13)).unwrap();
    assert_eq!(child.value(1, 0), Some(Value::Int64(13)));

    // Writing a foreign key moves the row out of the view
    view.set_data(0, 1, Value::Int64(2)).unwrap();
    assert_eq!(visible(&view), vec![(13, 1)]);

    assert_eq!(
        view.set_data(1, 0, Value::Null),
        Err(Error::row_out_of_range(1, 1))
    );
    assert_eq!(
        view.set_data(0, 5, Value::Null),
        Err(Error::column_out_of_range(5, 2))
    );
}

#[test]
fn test_writes_without_child_table() {
    let view = RelationFilter::new();
    assert_eq!(
        view.remove_row(0),
        Err(Error::table_not_attached(TableRole::Child))
    );
    assert_eq!(
        view.set_data(0, 0, Value::Null),
        Err(Error::table_not_attached(TableRole::Child))
    );
}

// ==================== Configuration ====================

#[test]
fn test_configuration_in_any_order() {
    let (child, parent) = (child_table(), parent_table());
    let view = RelationFilter::new();
    assert!(view.is_null());
    assert_eq!(view.column_count(), 0);

    // No parent yet, so nothing can be selected
    view.set_match_row(0);
    assert_eq!(view.match_row(), -1);

    view.set_parent_table(Some(&parent));
    view.set_match_row(0);
    view.set_child_table(Some(&child));
    assert_eq!(view.row_count(), 0);

    view.set_filter(Some(by_parent_id()));
    assert_eq!(visible(&view), vec![(11, 1), (12, 1)]);

    view.set_filter(None);
    assert_eq!(view.row_count(), 0);
    assert!(view.relation_key_for_equality().is_null());
}

#[test]
fn test_replacing_tables() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    let other_child = SharedTable::new(VariantTable::from_rows(vec![vec![30, 2], vec![31, 1]]));
    view.set_child_table(Some(&other_child));
    assert_eq!(visible(&view), vec![(30, 2)]);
    assert!(view.child_table().map_or(false, |t| t.ptr_eq(&other_child)));

    // Old table is no longer observed
    child.set_value(2, 1, Value::Int64(5)).unwrap();
    assert_eq!(child.subscription_count(), 0);

    let other_parent = SharedTable::new(VariantTable::from_rows(vec![vec![1]]));
    view.set_parent_table(Some(&other_parent));
    assert_eq!(view.match_row(), -1);
    view.set_match_row(0);
    assert_eq!(visible(&view), vec![(31, 1)]);
}

#[test]
fn test_filter_columns_out_of_range() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    view.set_filter(Some(FilterExpr::eq(child_column(7), parent_column(0))));
    assert_eq!(view.row_count(), 0);
    view.set_filter(Some(FilterExpr::eq(child_column(1), parent_column(3))));
    assert_eq!(view.row_count(), 0);

    // Inserting still works; the row just is not visible
    view.insert_row(0).unwrap();
    assert_eq!(child.row_count(), 4);
}

#[test]
fn test_relation_filter_from_pk_fk() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_filter(None);

    view.set_relation_filter_from_pk_fk(&PrimaryKey::new([0]), &ForeignKey::new([1]))
        .unwrap();
    view.set_match_row(1);
    assert_eq!(visible(&view), vec![(25, 2)]);
    assert_eq!(view.filter(), Some(by_parent_id()));

    let err = view.set_relation_filter_from_pk_fk(&PrimaryKey::new([0]), &ForeignKey::new(Vec::new()));
    assert!(matches!(err, Err(Error::InvalidKey { .. })));
    assert_eq!(view.filter(), Some(by_parent_id()));
}

#[test]
fn test_case_sensitivity() {
    let child = SharedTable::new(VariantTable::from_rows(vec![
        vec!["a1", "ACME"],
        vec!["a2", "acme"],
        vec!["b1", "Globex"],
    ]));
    let parent = SharedTable::new(VariantTable::from_rows(vec![vec!["Acme"]]));
    let view = view_of(&child, &parent);
    view.set_match_row(0);
    assert_eq!(view.current_child_rows(), vec![0, 1]);

    view.set_case_sensitivity(CaseSensitivity::Sensitive);
    assert_eq!(view.row_count(), 0);

    view.set_case_sensitivity(CaseSensitivity::Insensitive);
    view.set_filter(Some(
        by_parent_id().and(FilterExpr::like(child_column(0), "A?")),
    ));
    assert_eq!(view.current_child_rows(), vec![0, 1]);
}

#[test]
fn test_filter_with_or_and_literals() {
    let (child, parent) = (child_table(), parent_table());
    let filter = by_parent_id().and(
        FilterExpr::eq(child_column(0), literal(11)).or(FilterExpr::gt(child_column(0), literal(20))),
    );
    let view = RelationFilterBuilder::new()
        .filter(filter)
        .child_table(&child)
        .parent_table(&parent)
        .match_row(0)
        .build()
        .unwrap();
    assert_eq!(visible(&view), vec![(11, 1)]);
    assert_eq!(view.relation_key_for_equality().column_pair_count(), 1);

    // Edits to the OR branch columns are tracked too
    child.set_value(1, 0, Value::Int64(21)).unwrap();
    assert_eq!(visible(&view), vec![(11, 1), (21, 1)]);
}

// ==================== Reentrancy ====================

#[test]
fn test_listener_sees_consistent_view() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let (reader, sink) = (view.clone(), seen.clone());
    let id = view.subscribe(move |_| sink.borrow_mut().push(reader.current_child_rows()));

    child.set_value(2, 1, Value::Int64(1)).unwrap();
    view.remove_row(0).unwrap();

    assert_eq!(*seen.borrow(), vec![vec![0, 1, 2], vec![0, 1]]);
    assert!(view.unsubscribe(id));
}

#[test]
fn test_listener_may_write_through_view() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    // Every row that becomes visible gets id 0
    let writer = view.clone();
    view.subscribe(move |change| {
        if let TableChange::RowsInserted { pos, .. } = *change {
            writer.set_data(pos, 0, Value::Int64(0)).unwrap();
        }
    });

    view.insert_row(2).unwrap();
    assert_eq!(visible(&view), vec![(11, 1), (12, 1), (0, 1)]);
}

#[test]
fn test_self_relation_cascade_terminates() {
    // A tree in one table: (id, parent_id)
    let tree = SharedTable::new(VariantTable::from_rows(vec![
        vec![1, 0],
        vec![2, 1],
        vec![3, 1],
        vec![4, 2],
    ]));
    let view = view_of(&tree, &tree);
    view.set_match_row(0);
    assert_eq!(view.current_child_rows(), vec![1, 2]);

    tree.set_value(0, 0, Value::Int64(9)).unwrap();

    assert_eq!(tree.value(1, 1), Some(Value::Int64(9)));
    assert_eq!(tree.value(2, 1), Some(Value::Int64(9)));
    assert_eq!(tree.value(3, 1), Some(Value::Int64(2)));
    assert_eq!(view.current_child_rows(), vec![1, 2]);
}

#[test]
fn test_self_relation_insert_above_match_row() {
    // (id, parent_id); the match row holds id 3
    let tree = SharedTable::new(VariantTable::from_rows(vec![
        vec![5, 3],
        vec![1, 0],
        vec![3, 1],
        vec![6, 3],
    ]));
    let view = view_of(&tree, &tree);
    view.set_match_row(2);
    assert_eq!(view.current_child_rows(), vec![0, 3]);

    // The new row lands above the match row and pushes it down
    view.insert_row(0).unwrap();

    assert_eq!(view.match_row(), 3);
    assert_eq!(tree.value(3, 0), Some(Value::Int64(3)));
    assert_eq!(tree.value(0, 1), Some(Value::Int64(3)));
    assert_eq!(view.current_child_rows(), vec![0, 1, 4]);
    assert_eq!(view.data(0, 1), Some(Value::Int64(3)));
}

#[test]
fn test_self_relation_remove_match_row() {
    let tree = SharedTable::new(VariantTable::from_rows(vec![
        vec![1, 0],
        vec![2, 1],
        vec![3, 1],
    ]));
    let view = view_of(&tree, &tree);
    view.set_match_row(0);
    assert_eq!(view.row_count(), 2);

    tree.remove_rows(0, 1).unwrap();
    assert_eq!(view.match_row(), -1);
    assert_eq!(view.row_count(), 0);
}

#[test]
fn test_table_subscriber_reads_view_during_engine_writes() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let (reader, sink) = (view.clone(), seen.clone());
    child.subscribe(move |_| sink.borrow_mut().push(reader.row_count()));

    // Insert with key copy
    view.insert_row(0).unwrap();
    assert_eq!(view.row_count(), 3);
    assert!(!seen.borrow().is_empty());

    // Cascade into three child rows
    seen.borrow_mut().clear();
    parent.set_value(0, 0, Value::Int64(7)).unwrap();
    assert_eq!(seen.borrow().len(), 3);
    assert_eq!(view.row_count(), 3);

    // Removal and edit through the view
    view.remove_row(0).unwrap();
    view.set_data(0, 0, Value::Int64(99)).unwrap();
    assert_eq!(visible(&view), vec![(99, 7), (12, 7)]);
}

#[test]
fn test_table_subscriber_writes_view_during_cascade() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(0);

    // Stamp the id of every child row whose key is rewritten
    let writer = view.clone();
    child.subscribe(move |change| {
        if let TableChange::ValueChanged { row, column: 1 } = *change {
            if let Some(view_row) = writer.map_from_source(row) {
                writer.set_data(view_row, 0, Value::Int64(0)).unwrap();
            }
        }
    });

    parent.set_value(0, 0, Value::Int64(4)).unwrap();
    assert_eq!(visible(&view), vec![(0, 4), (0, 4)]);
    assert_eq!(child.value(2, 0), Some(Value::Int64(25)));
}

#[test]
fn test_map_between_view_and_source() {
    let (child, parent) = (child_table(), parent_table());
    let view = view_of(&child, &parent);
    view.set_match_row(1);

    assert_eq!(view.map_to_source(0), Some(2));
    assert_eq!(view.map_to_source(1), None);
    assert_eq!(view.map_from_source(2), Some(0));
    assert_eq!(view.map_from_source(0), None);
}
