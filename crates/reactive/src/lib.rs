//! Tether Reactive - Observable tables for Tether relation views.
//!
//! This crate provides the table abstraction the relation engine consumes and
//! the typed notifications tables emit when they change.
//!
//! # Core Concepts
//!
//! - `TableChange`: A structural or value change (rows inserted/removed, cell changed, reset)
//! - `TableModel`: Row/column storage with cell get/set and row insert/remove
//! - `VariantTable`: An in-memory `TableModel` of `Value` cells
//! - `SharedTable`: A shared, observable handle that notifies subscribers after each write
//! - `SubscriptionManager`: Tracks callbacks interested in a stream of events
//!
//! # Example
//!
//! ```
//! use tether_reactive::{SharedTable, TableChange, VariantTable};
//! use tether_core::Value;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let table = SharedTable::new(VariantTable::new(0, 2));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! table.subscribe(move |change| sink.borrow_mut().push(*change));
//!
//! table.insert_rows(0, 1).unwrap();
//! table.set_value(0, 1, Value::Int64(7)).unwrap();
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![
//!         TableChange::RowsInserted { pos: 0, count: 1 },
//!         TableChange::ValueChanged { row: 0, column: 1 },
//!     ]
//! );
//! ```

#![no_std]

extern crate alloc;

pub mod change;
pub mod observable;
pub mod subscription;
pub mod table;

pub use change::TableChange;
pub use observable::{SharedTable, TableId, WeakTable};
pub use subscription::{Listener, SubscriptionId, SubscriptionManager};
pub use table::{TableModel, VariantTable};

// Re-export commonly used types from dependencies
pub use tether_core::{Error, Result, Value};
