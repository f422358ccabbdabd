//! Tether Expr - Join filter expressions for Tether relation views.
//!
//! This crate provides the boolean expression a relation filter is configured
//! with, and the relation key derived from it:
//!
//! - `FilterExpr`: Comparisons between child columns, parent columns and
//!   literals, wildcard LIKE clauses, combined with AND/OR
//! - `evaluate`: Evaluates an expression against one child row and one parent row
//! - `RelationKey`: Ordered (parent column, child column) equality pairs
//! - `extract_equality_pairs`: Derives a `RelationKey` from the top-level AND
//!   chain of an expression
//! - `PrimaryKey` / `ForeignKey`: Column lists a relation key can be built from
//!
//! # Example
//!
//! ```
//! use tether_expr::{child_column, extract_equality_pairs, literal, parent_column, FilterExpr};
//!
//! // child.parent_id == parent.id AND child.kind != "archived"
//! let filter = FilterExpr::eq(child_column(1), parent_column(0))
//!     .and(FilterExpr::ne(child_column(2), literal("archived")));
//!
//! let key = extract_equality_pairs(Some(&filter));
//! assert_eq!(key.column_pair_count(), 1);
//! assert_eq!(key.column_pair_at(0).parent_column(), 0);
//! assert_eq!(key.column_pair_at(0).child_column(), 1);
//! ```

#![no_std]

extern crate alloc;

mod eval;
mod expr;
mod relation_key;

pub use eval::{evaluate, EvalContext, SliceRows};
pub use expr::{child_column, literal, parent_column, CompareOp, FilterExpr, Operand};
pub use relation_key::{
    extract_equality_pairs, ForeignKey, PrimaryKey, RelationColumnPair, RelationKey,
};
