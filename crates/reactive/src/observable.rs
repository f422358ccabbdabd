//! Observable table handles.
//!
//! `SharedTable` wraps a `TableModel` so that several owners can read and write
//! it, and so that every successful write is announced to subscribers as a
//! `TableChange`. The model borrow is released before subscribers run, so a
//! callback may read the table or write to other tables; it must not assume
//! it runs before the next write on the same table completes.

use crate::change::TableChange;
use crate::subscription::{SubscriptionId, SubscriptionManager};
use crate::table::TableModel;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use tether_core::{Result, Value};

/// Identity of a shared table, stable for its lifetime.
pub type TableId = u64;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// A `TableModel` that can be recovered as its concrete type for bulk edits.
trait ErasedModel: TableModel {
    fn as_model(&self) -> &dyn TableModel;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: TableModel + 'static> ErasedModel for M {
    fn as_model(&self) -> &dyn TableModel {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct TableCell {
    id: TableId,
    model: RefCell<Box<dyn ErasedModel>>,
    listeners: RefCell<SubscriptionManager<TableChange>>,
}

/// A shared, observable handle to a table.
///
/// Cloning the handle shares the same table.
#[derive(Clone)]
pub struct SharedTable {
    inner: Rc<TableCell>,
}

/// A non-owning handle to a `SharedTable`.
#[derive(Clone)]
pub struct WeakTable {
    id: TableId,
    inner: Weak<TableCell>,
}

impl SharedTable {
    /// Wraps a model into a new shared table.
    pub fn new<M: TableModel + 'static>(model: M) -> Self {
        Self {
            inner: Rc::new(TableCell {
                id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
                model: RefCell::new(Box::new(model)),
                listeners: RefCell::new(SubscriptionManager::new()),
            }),
        }
    }

    /// Returns this table's identity.
    #[inline]
    pub fn id(&self) -> TableId {
        self.inner.id
    }

    /// Returns a non-owning handle to this table.
    pub fn downgrade(&self) -> WeakTable {
        WeakTable {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns true if both handles refer to the same table.
    #[inline]
    pub fn ptr_eq(&self, other: &SharedTable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.inner.model.borrow().row_count()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.inner.model.borrow().column_count()
    }

    /// Returns a copy of the value at `(row, column)`, or `None` if out of range.
    pub fn value(&self, row: usize, column: usize) -> Option<Value> {
        self.inner.model.borrow().value(row, column).cloned()
    }

    /// Runs `f` with read access to the model.
    ///
    /// Use this to read many cells under a single borrow.
    pub fn read<R>(&self, f: impl FnOnce(&dyn TableModel) -> R) -> R {
        f(self.inner.model.borrow().as_model())
    }

    /// Stores `value` at `(row, column)`.
    ///
    /// Subscribers receive `ValueChanged` only if the stored value actually
    /// changed.
    pub fn set_value(&self, row: usize, column: usize, value: Value) -> Result<()> {
        let changed = self.inner.model.borrow_mut().set_value(row, column, value)?;
        if changed {
            self.notify(TableChange::ValueChanged { row, column });
        }
        Ok(())
    }

    /// Inserts `count` empty rows before `pos`.
    pub fn insert_rows(&self, pos: usize, count: usize) -> Result<()> {
        self.inner.model.borrow_mut().insert_rows(pos, count)?;
        if count > 0 {
            self.notify(TableChange::RowsInserted { pos, count });
        }
        Ok(())
    }

    /// Removes the rows `[pos, pos + count)`.
    pub fn remove_rows(&self, pos: usize, count: usize) -> Result<()> {
        self.inner.model.borrow_mut().remove_rows(pos, count)?;
        if count > 0 {
            self.notify(TableChange::RowsRemoved { pos, count });
        }
        Ok(())
    }

    /// Applies an arbitrary bulk change and announces it as a `Reset`.
    ///
    /// Use this for repopulation and column count changes. Returns `None`,
    /// without notifying, if the table does not hold an `M`.
    pub fn reset_with<M, R>(&self, f: impl FnOnce(&mut M) -> R) -> Option<R>
    where
        M: TableModel + 'static,
    {
        let result = {
            let mut model = self.inner.model.borrow_mut();
            f(model.as_any_mut().downcast_mut::<M>()?)
        };
        self.notify(TableChange::Reset);
        Some(result)
    }

    /// Subscribes to changes of this table.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&TableChange) + 'static,
    {
        self.inner.listeners.borrow_mut().subscribe(callback)
    }

    /// Unsubscribes by ID.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.borrow_mut().unsubscribe(id)
    }

    /// Returns the number of subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self, change: TableChange) {
        log::trace!("table {}: {:?}", self.inner.id, change);
        let callbacks = self.inner.listeners.borrow().callbacks();
        for callback in callbacks {
            callback(&change);
        }
    }
}

impl fmt::Debug for SharedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTable")
            .field("id", &self.inner.id)
            .field("rows", &self.row_count())
            .field("columns", &self.column_count())
            .finish()
    }
}

impl WeakTable {
    /// Returns the identity of the referenced table.
    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Returns a shared handle if the table is still alive.
    pub fn upgrade(&self) -> Option<SharedTable> {
        self.inner.upgrade().map(|inner| SharedTable { inner })
    }

    /// Returns true if the table has been dropped.
    pub fn is_dangling(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl fmt::Debug for WeakTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTable").field("id", &self.id).finish()
    }
}
