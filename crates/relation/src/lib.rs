//! Tether Relation - Live parent/child relation views.
//!
//! A `RelationFilter` exposes the rows of a child table related to the
//! currently selected row of a parent table, and maintains that subset
//! incrementally as both tables change.
//!
//! # Core Concepts
//!
//! - `RelationFilter`: The view; reads, writes and notifications in view rows
//! - `MatchRow`: The selected parent row, or none
//! - `RowList`: Sorted child rows currently visible, patched per change
//! - `RelationFilterBuilder`: Assembles a configured view
//!
//! Editing a key column of the selected parent row writes the new value into
//! the key column of every visible child row, so related rows follow their
//! parent. Inserting through the view pre-fills the key columns of the new
//! child row.
//!
//! # Example
//!
//! ```
//! use tether_expr::{child_column, parent_column, FilterExpr};
//! use tether_reactive::{SharedTable, VariantTable};
//! use tether_relation::RelationFilterBuilder;
//! use tether_core::Value;
//!
//! // (id, parent_id) and (id)
//! let child = SharedTable::new(VariantTable::from_rows(vec![vec![11, 1], vec![12, 1], vec![25, 2]]));
//! let parent = SharedTable::new(VariantTable::from_rows(vec![vec![1], vec![2]]));
//!
//! let view = RelationFilterBuilder::new()
//!     .filter(FilterExpr::eq(child_column(1), parent_column(0)))
//!     .child_table(&child)
//!     .parent_table(&parent)
//!     .match_row(0)
//!     .build()
//!     .unwrap();
//! assert_eq!(view.row_count(), 2);
//!
//! // Renaming the parent drags its children along
//! parent.set_value(0, 0, Value::Int64(7)).unwrap();
//! assert_eq!(child.value(1, 1), Some(Value::Int64(7)));
//! assert_eq!(view.row_count(), 2);
//! ```

#![no_std]

extern crate alloc;

mod builder;
mod filter;
mod key_copier;
mod match_row;
mod options;
mod row_list;
mod row_pair;

pub use builder::RelationFilterBuilder;
pub use filter::RelationFilter;
pub use match_row::MatchRow;
pub use options::FilterOptions;
pub use row_list::RowList;

// Re-export commonly used types from dependencies
pub use tether_core::{CaseSensitivity, Error, Result, Value};
pub use tether_expr::{FilterExpr, ForeignKey, PrimaryKey, RelationKey};
pub use tether_reactive::{SharedTable, TableChange};
