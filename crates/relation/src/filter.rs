//! The relation filter engine.
//!
//! A `RelationFilter` shows the rows of a child table that satisfy a filter
//! expression against the current row of a parent table, and keeps that view
//! up to date as either table changes.
//!
//! Table notifications are not handled inside the table's callback directly.
//! They are posted to a mailbox. When the engine is idle the callback drains
//! the mailbox right away. While the engine writes to a table itself (row
//! insertion through the view, key cascades) notifications only queue up, and
//! the engine drains them once the write returns. The engine state is never
//! borrowed across a table write, so table subscribers may use the view at any
//! time, and every write the engine makes is fully processed before its next
//! step runs.
//!
//! View notifications are collected while the engine state is held and are
//! dispatched to subscribers after it is released, so subscribers may read the
//! view or write to the tables.

use crate::key_copier::{plan_cascade, plan_key_copy, KeyWrite};
use crate::match_row::MatchRow;
use crate::options::FilterOptions;
use crate::row_list::RowList;
use crate::row_pair::row_matches;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::mem;
use hashbrown::HashSet;
use tether_core::{CaseSensitivity, Error, Result, TableRole, Value};
use tether_expr::{extract_equality_pairs, FilterExpr, ForeignKey, PrimaryKey, RelationKey};
use tether_reactive::{
    SharedTable, SubscriptionId, SubscriptionManager, TableChange, TableId, WeakTable,
};

/// A table notification waiting to be handled.
#[derive(Clone, Copy, Debug)]
struct Envelope {
    role: TableRole,
    table: TableId,
    change: TableChange,
}

type Mailbox = Rc<RefCell<VecDeque<Envelope>>>;

/// A table the engine observes without owning it.
struct Attached {
    table: WeakTable,
    subscription: SubscriptionId,
}

impl Attached {
    fn upgrade(&self) -> Option<SharedTable> {
        self.table.upgrade()
    }

    fn detach(self) {
        if let Some(table) = self.table.upgrade() {
            table.unsubscribe(self.subscription);
        }
    }
}

/// Key writes of a cascade, applied once the engine state is released.
struct Cascade {
    child: SharedTable,
    writes: Vec<KeyWrite>,
}

/// A child row to insert through the view, with its key values.
struct InsertPlan {
    child: SharedTable,
    target: usize,
    keys: Vec<KeyWrite>,
}

/// Columns the filter reads, cached when the filter is set.
#[derive(Debug, Default)]
struct ReferencedColumns {
    child: HashSet<usize>,
    parent: HashSet<usize>,
    greatest_child: Option<usize>,
    greatest_parent: Option<usize>,
}

impl ReferencedColumns {
    fn of(filter: Option<&FilterExpr>) -> Self {
        match filter {
            Some(filter) => Self {
                child: filter.referenced_child_columns(),
                parent: filter.referenced_parent_columns(),
                greatest_child: filter.greatest_child_column(),
                greatest_parent: filter.greatest_parent_column(),
            },
            None => Self::default(),
        }
    }
}

/// Tables and parent row the filter can be evaluated against right now.
struct Scope {
    child: SharedTable,
    parent: SharedTable,
    match_row: usize,
}

impl Scope {
    /// Runs `f` with a predicate telling whether a child row passes `filter`.
    fn with_matcher<R>(
        &self,
        filter: &FilterExpr,
        case: CaseSensitivity,
        f: impl FnOnce(&mut dyn FnMut(usize) -> bool) -> R,
    ) -> R {
        self.child.read(|child| {
            self.parent.read(|parent| {
                let mut matches =
                    |row: usize| row_matches(filter, child, row, parent, self.match_row, case);
                f(&mut matches)
            })
        })
    }
}

struct FilterState {
    child: Option<Attached>,
    parent: Option<Attached>,
    filter: Option<FilterExpr>,
    key: RelationKey,
    columns: ReferencedColumns,
    options: FilterOptions,
    match_row: MatchRow,
    rows: RowList,
    mailbox: Mailbox,
    /// View changes not yet dispatched
    outbox: Vec<TableChange>,
    cascading: bool,
    /// Parent changes received during a cascade
    deferred: VecDeque<Envelope>,
}

impl FilterState {
    fn new(mailbox: Mailbox) -> Self {
        Self {
            child: None,
            parent: None,
            filter: None,
            key: RelationKey::new(),
            columns: ReferencedColumns::default(),
            options: FilterOptions::default(),
            match_row: MatchRow::NoMatch,
            rows: RowList::new(),
            mailbox,
            outbox: Vec::new(),
            cascading: false,
            deferred: VecDeque::new(),
        }
    }

    fn slot(&self, role: TableRole) -> &Option<Attached> {
        match role {
            TableRole::Child => &self.child,
            TableRole::Parent => &self.parent,
        }
    }

    fn slot_mut(&mut self, role: TableRole) -> &mut Option<Attached> {
        match role {
            TableRole::Child => &mut self.child,
            TableRole::Parent => &mut self.parent,
        }
    }

    fn table(&self, role: TableRole) -> Option<SharedTable> {
        self.slot(role).as_ref().and_then(Attached::upgrade)
    }

    fn attached_id(&self, role: TableRole) -> Option<TableId> {
        self.slot(role).as_ref().map(|a| a.table.id())
    }

    fn is_dropped(&self, role: TableRole) -> bool {
        self.slot(role)
            .as_ref()
            .map_or(false, |a| a.table.is_dangling())
    }

    /// True if the same table is attached as child and parent.
    fn shares_table(&self) -> bool {
        let child = self.attached_id(TableRole::Child);
        child.is_some() && child == self.attached_id(TableRole::Parent)
    }

    /// Rows shown by the view. Empty as soon as a table is dropped, before
    /// the engine gets to release it.
    fn visible(&self) -> &[usize] {
        if self.is_dropped(TableRole::Child) || self.is_dropped(TableRole::Parent) {
            &[]
        } else {
            self.rows.as_slice()
        }
    }

    fn current_match(&self) -> MatchRow {
        if self.is_dropped(TableRole::Parent) {
            MatchRow::NoMatch
        } else {
            self.match_row
        }
    }

    /// Detaches tables that have been dropped and empties the view.
    fn release_dropped(&mut self) {
        let mut dropped = false;
        for role in [TableRole::Child, TableRole::Parent] {
            if self.is_dropped(role) {
                *self.slot_mut(role) = None;
                dropped = true;
                log::debug!("relation filter: {} table dropped", role);
            }
        }
        if !dropped {
            return;
        }
        if self.parent.is_none() {
            self.match_row = MatchRow::NoMatch;
        }
        self.refresh();
    }

    fn take_events(&mut self) -> Vec<TableChange> {
        mem::take(&mut self.outbox)
    }

    fn emit(&mut self, change: Option<TableChange>) {
        if let Some(change) = change {
            log::trace!("relation filter: view {:?}", change);
            self.outbox.push(change);
        }
    }

    /// Returns what the filter is evaluated against, or `None` if the
    /// configuration does not allow evaluation and the view must stay empty.
    fn scope(&self) -> Option<Scope> {
        self.filter.as_ref()?;
        let child = self.table(TableRole::Child)?;
        let parent = self.table(TableRole::Parent)?;
        let match_row = self.match_row.row()?;
        if match_row >= parent.row_count() {
            return None;
        }
        let out_of_bounds = |greatest: Option<usize>, column_count: usize| {
            greatest.map_or(false, |c| c >= column_count)
        };
        if out_of_bounds(self.columns.greatest_child, child.column_count())
            || out_of_bounds(self.columns.greatest_parent, parent.column_count())
        {
            log::debug!("relation filter: filter columns out of range, view is empty");
            return None;
        }
        Some(Scope {
            child,
            parent,
            match_row,
        })
    }

    /// Rebuilds the row list. Returns true if it changed.
    fn recompute(&mut self) -> bool {
        let changed = match (self.scope(), self.filter.as_ref()) {
            (Some(scope), Some(filter)) => {
                let rows = &mut self.rows;
                scope.with_matcher(filter, self.options.case_sensitivity, |matches| {
                    rows.recompute(scope.child.row_count(), matches)
                })
            }
            _ => self.rows.clear(),
        };
        log::debug!(
            "relation filter: recomputed, {} rows visible ({})",
            self.rows.len(),
            self.match_row
        );
        changed
    }

    /// Rebuilds the row list and announces a reset.
    fn refresh(&mut self) {
        self.recompute();
        self.outbox.push(TableChange::Reset);
    }

    /// Handles queued notifications until the mailbox is empty or one of
    /// them starts a cascade, which the caller applies.
    fn drain_mailbox(&mut self) -> Option<Cascade> {
        loop {
            let next = self.mailbox.borrow_mut().pop_front();
            let envelope = next?;
            if self.cascading && envelope.role == TableRole::Parent {
                self.deferred.push_back(envelope);
                continue;
            }
            if let Some(cascade) = self.handle(envelope) {
                return Some(cascade);
            }
        }
    }

    fn handle(&mut self, envelope: Envelope) -> Option<Cascade> {
        // Left over from a table that has since been replaced
        if self.attached_id(envelope.role) != Some(envelope.table) {
            return None;
        }
        match envelope.role {
            TableRole::Child => {
                self.on_child_change(envelope.change);
                None
            }
            TableRole::Parent => self.on_parent_change(envelope.change),
        }
    }

    /// Moves the match row along with inserted or removed parent rows.
    /// Returns true if the matched row was removed; the view is then rebuilt.
    fn follow_parent(&mut self, change: TableChange) -> bool {
        let next = self.match_row.follow(change);
        let lost = self.match_row.is_matched() && !next.is_matched();
        self.match_row = next;
        if lost {
            log::debug!("relation filter: matched parent row removed");
            self.refresh();
        }
        lost
    }

    fn on_child_change(&mut self, change: TableChange) {
        // A table related to itself moves its match row before the rows are
        // patched, so new rows are evaluated against the right parent
        if change.is_structural() && self.shares_table() && self.follow_parent(change) {
            return;
        }
        let case = self.options.case_sensitivity;
        match change {
            TableChange::RowsInserted { pos, count } => {
                let patch = match (self.scope(), self.filter.as_ref()) {
                    (Some(scope), Some(filter)) => {
                        let rows = &mut self.rows;
                        scope.with_matcher(filter, case, |matches| {
                            rows.on_rows_inserted(pos, count, matches)
                        })
                    }
                    _ => self.rows.on_rows_inserted(pos, count, |_| false),
                };
                self.emit(patch);
            }
            TableChange::RowsRemoved { pos, count } => {
                let patch = self.rows.on_rows_removed(pos, count);
                self.emit(patch);
            }
            TableChange::ValueChanged { row, column } => {
                let referenced = self.columns.child.contains(&column);
                let matches = match (self.scope(), self.filter.as_ref()) {
                    (Some(scope), Some(filter)) if referenced => {
                        scope.with_matcher(filter, case, |matches| matches(row))
                    }
                    _ => self.rows.contains(row),
                };
                let patch = self.rows.on_value_changed(row, column, matches);
                self.emit(patch);
            }
            TableChange::Reset => self.refresh(),
        }
    }

    /// Parent edits on the match row cascade when they hit a key column and
    /// rebuild the view when they hit any other column the filter reads.
    fn on_parent_change(&mut self, change: TableChange) -> Option<Cascade> {
        match change {
            TableChange::RowsInserted { .. } | TableChange::RowsRemoved { .. } => {
                // Handled with the child notification when the table is shared
                if !self.shares_table() {
                    self.follow_parent(change);
                }
            }
            TableChange::ValueChanged { row, column } => {
                if self.match_row.row() != Some(row) {
                    return None;
                }
                if self.key.child_column_for(column).is_some() {
                    if let Some(cascade) = self.begin_cascade(column) {
                        return Some(cascade);
                    }
                } else if !self.columns.parent.contains(&column) {
                    return None;
                }
                if self.recompute() {
                    self.outbox.push(TableChange::Reset);
                }
            }
            TableChange::Reset => {
                let row_count = self.table(TableRole::Parent).map_or(0, |p| p.row_count());
                self.match_row = self.match_row.clamp(row_count);
                self.refresh();
            }
        }
        None
    }

    /// Plans writing the new value of key column `parent_column` into every
    /// visible child row. Parent changes wait until `finish_cascade`.
    fn begin_cascade(&mut self, parent_column: usize) -> Option<Cascade> {
        let scope = self.scope()?;
        let writes = scope.parent.read(|parent| {
            plan_cascade(
                &self.key,
                parent_column,
                parent,
                scope.match_row,
                self.rows.as_slice(),
            )
        });
        if writes.is_empty() {
            return None;
        }
        log::debug!(
            "relation filter: cascading parent column {} into {} child rows",
            parent_column,
            writes.len()
        );
        self.cascading = true;
        Some(Cascade {
            child: scope.child,
            writes,
        })
    }

    fn finish_cascade(&mut self) {
        self.cascading = false;
        {
            // Parent changes seen during the cascade are handled next, in order
            let mut mailbox = self.mailbox.borrow_mut();
            while let Some(envelope) = self.deferred.pop_back() {
                mailbox.push_front(envelope);
            }
        }
        if self.recompute() {
            self.outbox.push(TableChange::Reset);
        }
    }

    fn replace_table(&mut self, role: TableRole, attached: Option<Attached>) {
        if let Some(old) = mem::replace(self.slot_mut(role), attached) {
            old.detach();
        }
        if role == TableRole::Parent {
            self.match_row = MatchRow::NoMatch;
        }
        log::debug!("relation filter: {} table replaced", role);
        self.refresh();
    }

    fn set_filter(&mut self, filter: Option<FilterExpr>) {
        self.key = extract_equality_pairs(filter.as_ref());
        self.columns = ReferencedColumns::of(filter.as_ref());
        self.filter = filter;
        log::debug!(
            "relation filter: filter set, {} key pairs",
            self.key.column_pair_count()
        );
        self.refresh();
    }

    fn set_options(&mut self, options: FilterOptions) {
        if self.options == options {
            return;
        }
        self.options = options;
        self.refresh();
    }

    fn set_match_row(&mut self, row: isize) {
        let row_count = self.table(TableRole::Parent).map_or(0, |p| p.row_count());
        let next = MatchRow::select(row, row_count);
        if next == self.match_row {
            return;
        }
        log::debug!("relation filter: match {} -> {}", self.match_row, next);
        self.match_row = next;
        self.refresh();
    }

    fn child_for_write(&self) -> Result<SharedTable> {
        self.table(TableRole::Child)
            .ok_or_else(|| Error::table_not_attached(TableRole::Child))
    }

    fn plan_insert(&self, view_pos: usize) -> Result<InsertPlan> {
        let child = self.table(TableRole::Child);
        debug_assert!(child.is_some(), "insert_row with no child table attached");
        let child = child.ok_or_else(|| Error::table_not_attached(TableRole::Child))?;
        if view_pos > self.rows.len() {
            return Err(Error::row_out_of_range(view_pos, self.rows.len()));
        }
        let target = self
            .rows
            .to_source(view_pos)
            .unwrap_or_else(|| child.row_count());

        // Read before inserting: the insertion may move the parent row
        let keys = match (self.table(TableRole::Parent), self.match_row.row()) {
            (Some(parent), Some(match_row)) => {
                parent.read(|p| plan_key_copy(&self.key, p, match_row, target))
            }
            _ => Vec::new(),
        };
        Ok(InsertPlan { child, target, keys })
    }

    fn plan_remove(&self, view_pos: usize, count: usize) -> Result<(SharedTable, Vec<usize>)> {
        let child = self.child_for_write()?;
        let len = self.rows.len();
        let end = view_pos.saturating_add(count);
        if end > len {
            return Err(Error::row_out_of_range(view_pos.max(len), len));
        }
        Ok((child, self.rows.as_slice()[view_pos..end].to_vec()))
    }

    fn plan_set_data(&self, view_row: usize) -> Result<(SharedTable, usize)> {
        let child = self.child_for_write()?;
        let row = self
            .rows
            .to_source(view_row)
            .ok_or_else(|| Error::row_out_of_range(view_row, self.rows.len()))?;
        Ok((child, row))
    }
}

struct Shared {
    state: RefCell<FilterState>,
    mailbox: Mailbox,
    listeners: RefCell<SubscriptionManager<TableChange>>,
    pending: RefCell<VecDeque<TableChange>>,
    dispatching: Cell<bool>,
    /// Set while the engine writes to a table
    writing: Cell<bool>,
}

impl Shared {
    /// Handles queued table notifications, unless the engine is busy.
    fn pump(&self) {
        // The engine drains the mailbox itself once it is done
        if self.writing.get() || self.state.try_borrow_mut().is_err() {
            return;
        }
        let events = self.settle();
        self.dispatch(events);
    }

    /// Runs a table write. Notifications it causes are only queued.
    fn write<R>(&self, f: impl FnOnce() -> R) -> R {
        let outer = self.writing.replace(true);
        let result = f();
        self.writing.set(outer);
        result
    }

    /// Handles every queued notification and returns the view changes to
    /// dispatch. Cascade writes run with the state released.
    fn settle(&self) -> Vec<TableChange> {
        let mut events = Vec::new();
        loop {
            let cascade = {
                let mut state = self.state.borrow_mut();
                let cascade = state.drain_mailbox();
                events.append(&mut state.take_events());
                cascade
            };
            let Some(Cascade { child, writes }) = cascade else {
                break;
            };
            for key in writes {
                let (row, column) = (key.row, key.column);
                if let Err(err) = self.write(|| child.set_value(row, column, key.value)) {
                    log::debug!("relation filter: key write to child row {} failed: {}", row, err);
                }
                // Parent changes are held back, so no cascade starts here
                let mut state = self.state.borrow_mut();
                let nested = state.drain_mailbox();
                debug_assert!(nested.is_none());
                events.append(&mut state.take_events());
            }
            let mut state = self.state.borrow_mut();
            state.finish_cascade();
            events.append(&mut state.take_events());
        }
        events
    }

    fn dispatch(&self, events: Vec<TableChange>) {
        self.pending.borrow_mut().extend(events);
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else {
                break;
            };
            let callbacks = self.listeners.borrow().callbacks();
            for callback in callbacks {
                callback(&change);
            }
        }
        self.dispatching.set(false);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for attached in [state.child.take(), state.parent.take()].into_iter().flatten() {
            attached.detach();
        }
    }
}

/// A live view of the child rows related to the current parent row.
///
/// The view shows, in child table order, every child row for which the filter
/// holds against the parent row selected with [`set_match_row`]. Tables are
/// observed through weak references; the view becomes empty when either one
/// is dropped or detached.
///
/// Configuration problems never fail: with no filter, a missing table, no
/// parent row selected or filter columns past the end of a table, the view is
/// simply empty.
///
/// Cloning the handle shares the same view. Subscribers of the view and of
/// either table may read and write the view from their callbacks.
///
/// [`set_match_row`]: RelationFilter::set_match_row
#[derive(Clone)]
pub struct RelationFilter {
    shared: Rc<Shared>,
}

impl Default for RelationFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationFilter {
    /// Creates an unconfigured, empty view.
    pub fn new() -> Self {
        let mailbox: Mailbox = Rc::new(RefCell::new(VecDeque::new()));
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(FilterState::new(mailbox.clone())),
                mailbox,
                listeners: RefCell::new(SubscriptionManager::new()),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
                writing: Cell::new(false),
            }),
        }
    }

    /// Runs `f` on the state, then handles the notifications it caused and
    /// dispatches the resulting view changes.
    fn with_state<R>(&self, f: impl FnOnce(&mut FilterState) -> R) -> R {
        let mut events = self.shared.settle();
        let result = {
            let mut state = self.shared.state.borrow_mut();
            state.release_dropped();
            let result = f(&mut state);
            events.append(&mut state.take_events());
            result
        };
        events.append(&mut self.shared.settle());
        self.shared.dispatch(events);
        result
    }

    /// Handles notifications queued by a table write.
    fn flush(&self) {
        self.with_state(|_| ());
    }

    fn attach(&self, role: TableRole, table: &SharedTable) -> Attached {
        let mailbox = self.shared.mailbox.clone();
        let owner = Rc::downgrade(&self.shared);
        let id = table.id();
        let subscription = table.subscribe(move |change| {
            mailbox.borrow_mut().push_back(Envelope {
                role,
                table: id,
                change: *change,
            });
            if let Some(shared) = owner.upgrade() {
                shared.pump();
            }
        });
        Attached {
            table: table.downgrade(),
            subscription,
        }
    }

    fn set_table(&self, role: TableRole, table: Option<&SharedTable>) {
        let current = self.shared.state.borrow().attached_id(role);
        if current == table.map(SharedTable::id) {
            return;
        }
        let attached = table.map(|t| self.attach(role, t));
        self.with_state(|state| state.replace_table(role, attached));
    }

    /// Attaches the table whose rows are filtered, or detaches it with `None`.
    pub fn set_child_table(&self, table: Option<&SharedTable>) {
        self.set_table(TableRole::Child, table);
    }

    /// Attaches the table holding the match row, or detaches it with `None`.
    ///
    /// Attaching a different table resets the match row to `NoMatch`.
    pub fn set_parent_table(&self, table: Option<&SharedTable>) {
        self.set_table(TableRole::Parent, table);
    }

    /// Returns the attached child table, if it is still alive.
    pub fn child_table(&self) -> Option<SharedTable> {
        self.shared.state.borrow().table(TableRole::Child)
    }

    /// Returns the attached parent table, if it is still alive.
    pub fn parent_table(&self) -> Option<SharedTable> {
        self.shared.state.borrow().table(TableRole::Parent)
    }

    /// Sets the filter expression and derives the relation key from it.
    pub fn set_filter(&self, filter: Option<FilterExpr>) {
        self.with_state(|state| state.set_filter(filter));
    }

    /// Sets the filter `child[fk[i]] == parent[pk[i]]` for every key column.
    ///
    /// Fails, leaving the filter unchanged, if the keys cannot be paired.
    pub fn set_relation_filter_from_pk_fk(&self, pk: &PrimaryKey, fk: &ForeignKey) -> Result<()> {
        let key = RelationKey::from_keys(pk, fk)?;
        self.set_filter(key.to_filter());
        Ok(())
    }

    pub fn filter(&self) -> Option<FilterExpr> {
        self.shared.state.borrow().filter.clone()
    }

    /// Returns true if no filter is set.
    pub fn is_null(&self) -> bool {
        self.shared.state.borrow().filter.is_none()
    }

    /// Returns the equality pairs extracted from the filter.
    pub fn relation_key_for_equality(&self) -> RelationKey {
        self.shared.state.borrow().key.clone()
    }

    /// Returns the current options.
    pub fn options(&self) -> FilterOptions {
        self.shared.state.borrow().options
    }

    /// Replaces the options. The view is rebuilt if they differ.
    pub fn set_options(&self, options: FilterOptions) {
        self.with_state(|state| state.set_options(options));
    }

    /// Sets how strings are compared and matched, keeping the other options.
    pub fn set_case_sensitivity(&self, case_sensitivity: CaseSensitivity) {
        let options = self.options().with_case_sensitivity(case_sensitivity);
        self.set_options(options);
    }

    /// Selects parent row `row` as the match row.
    ///
    /// Negative or out-of-range values select no row, which empties the view.
    /// Selecting the current match row again does nothing.
    pub fn set_match_row(&self, row: isize) {
        self.with_state(|state| state.set_match_row(row));
    }

    /// Returns the match row, or -1 if none is selected.
    pub fn match_row(&self) -> isize {
        self.shared.state.borrow().current_match().to_index()
    }

    /// Returns the match row as a `MatchRow`.
    pub fn current_match(&self) -> MatchRow {
        self.shared.state.borrow().current_match()
    }

    /// Returns the number of visible rows.
    pub fn row_count(&self) -> usize {
        self.shared.state.borrow().visible().len()
    }

    /// Returns the child table's column count, or 0 with no child table.
    pub fn column_count(&self) -> usize {
        self.child_table().map_or(0, |t| t.column_count())
    }

    /// Returns the value shown at `(view_row, column)`, or `None` if out of range.
    pub fn data(&self, view_row: usize, column: usize) -> Option<Value> {
        let state = self.shared.state.borrow();
        let row = *state.visible().get(view_row)?;
        state.table(TableRole::Child)?.value(row, column)
    }

    /// Returns the child row shown at `view_row`.
    pub fn map_to_source(&self, view_row: usize) -> Option<usize> {
        self.shared.state.borrow().visible().get(view_row).copied()
    }

    /// Returns the view row showing child row `source_row`, if visible.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        let state = self.shared.state.borrow();
        if state.visible().is_empty() {
            return None;
        }
        state.rows.to_view(source_row)
    }

    /// Returns the visible child rows, in order.
    pub fn current_child_rows(&self) -> Vec<usize> {
        self.shared.state.borrow().visible().to_vec()
    }

    /// Returns true if a child table is attached and a parent row is selected.
    pub fn can_insert(&self) -> bool {
        let state = self.shared.state.borrow();
        state.table(TableRole::Child).is_some() && state.current_match().is_matched()
    }

    /// Inserts a child row so that it appears at `view_pos`.
    ///
    /// The new row gets the match row's key values. With no parent row
    /// selected the key columns stay Null and the row is not visible.
    pub fn insert_row(&self, view_pos: usize) -> Result<()> {
        let plan = self.with_state(|state| state.plan_insert(view_pos))?;
        let inserted: Result<()> = self.shared.write(|| {
            plan.child.insert_rows(plan.target, 1)?;
            // Key values go in before the insertion is handled, so the new
            // row is evaluated with them
            for key in plan.keys {
                if let Err(err) = plan.child.set_value(key.row, key.column, key.value) {
                    log::debug!(
                        "relation filter: key copy into row {} failed: {}",
                        plan.target,
                        err
                    );
                }
            }
            Ok(())
        });
        self.flush();
        inserted
    }

    /// Removes the child row shown at `view_pos`.
    pub fn remove_row(&self, view_pos: usize) -> Result<()> {
        self.remove_rows(view_pos, 1)
    }

    /// Removes the child rows shown at `[view_pos, view_pos + count)`.
    pub fn remove_rows(&self, view_pos: usize, count: usize) -> Result<()> {
        let (child, rows) = self.with_state(|state| state.plan_remove(view_pos, count))?;
        // Last to first, so the remaining source rows stay put
        let removed = self
            .shared
            .write(|| rows.iter().rev().try_for_each(|&row| child.remove_rows(row, 1)));
        self.flush();
        removed
    }

    /// Writes `value` into the child row shown at `view_row`.
    pub fn set_data(&self, view_row: usize, column: usize, value: Value) -> Result<()> {
        let (child, row) = self.with_state(|state| state.plan_set_data(view_row))?;
        let written = self.shared.write(|| child.set_value(row, column, value));
        self.flush();
        written
    }

    /// Subscribes to changes of the view, reported in view rows.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&TableChange) + 'static,
    {
        self.shared.listeners.borrow_mut().subscribe(callback)
    }

    /// Unsubscribes by ID. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.listeners.borrow_mut().unsubscribe(id)
    }
}

impl fmt::Debug for RelationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("RelationFilter")
            .field("match_row", &state.current_match())
            .field("key", &state.key)
            .field("rows", &state.visible())
            .finish()
    }
}
