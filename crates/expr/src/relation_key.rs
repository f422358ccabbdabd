//! Relation keys: the equality pairs tying a child table to its parent.

use crate::expr::{child_column, parent_column, CompareOp, FilterExpr, Operand};
use alloc::format;
use alloc::vec::Vec;
use core::slice;
use tether_core::{Error, Result};

/// One `parent column == child column` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RelationColumnPair {
    parent_column: usize,
    child_column: usize,
}

impl RelationColumnPair {
    pub fn new(parent_column: usize, child_column: usize) -> Self {
        Self {
            parent_column,
            child_column,
        }
    }

    #[inline]
    pub fn parent_column(&self) -> usize {
        self.parent_column
    }

    #[inline]
    pub fn child_column(&self) -> usize {
        self.child_column
    }
}

/// Columns of the parent table forming its primary key, in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimaryKey(Vec<usize>);

impl PrimaryKey {
    pub fn new(columns: impl Into<Vec<usize>>) -> Self {
        Self(columns.into())
    }

    pub fn columns(&self) -> &[usize] {
        &self.0
    }

    pub fn column_count(&self) -> usize {
        self.0.len()
    }
}

/// Columns of the child table referencing a parent primary key, in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForeignKey(Vec<usize>);

impl ForeignKey {
    pub fn new(columns: impl Into<Vec<usize>>) -> Self {
        Self(columns.into())
    }

    pub fn columns(&self) -> &[usize] {
        &self.0
    }

    pub fn column_count(&self) -> usize {
        self.0.len()
    }
}

/// Ordered set of (parent column, child column) equality pairs.
///
/// Within a key, no parent column and no child column appears twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationKey {
    pairs: Vec<RelationColumnPair>,
}

impl RelationKey {
    /// Creates an empty key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `pk[i]` of the parent with `fk[i]` of the child.
    pub fn from_keys(pk: &PrimaryKey, fk: &ForeignKey) -> Result<Self> {
        let mut key = Self::new();
        key.set_key(pk, fk)?;
        Ok(key)
    }

    /// Replaces this key by the pairing of `pk` with `fk`.
    ///
    /// On error the key is left unchanged.
    pub fn set_key(&mut self, pk: &PrimaryKey, fk: &ForeignKey) -> Result<()> {
        if pk.column_count() != fk.column_count() {
            return Err(Error::invalid_key(format!(
                "primary key has {} columns, foreign key has {}",
                pk.column_count(),
                fk.column_count()
            )));
        }
        let mut key = Self::new();
        for (&p, &c) in pk.columns().iter().zip(fk.columns()) {
            if !key.add_column_pair(p, c) {
                return Err(Error::invalid_key(format!(
                    "column pair ({}, {}) repeats a column",
                    p, c
                )));
            }
        }
        *self = key;
        Ok(())
    }

    /// Appends a pair.
    ///
    /// Returns false, leaving the key unchanged, if either column is already
    /// part of the key.
    pub fn add_column_pair(&mut self, parent_column: usize, child_column: usize) -> bool {
        let taken = self
            .pairs
            .iter()
            .any(|p| p.parent_column == parent_column || p.child_column == child_column);
        if taken {
            return false;
        }
        self.pairs
            .push(RelationColumnPair::new(parent_column, child_column));
        true
    }

    /// Returns the pair at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= column_pair_count()`.
    #[inline]
    pub fn column_pair_at(&self, index: usize) -> RelationColumnPair {
        self.pairs[index]
    }

    #[inline]
    pub fn column_pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the key has no pairs.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains_column_pair(&self, parent_column: usize, child_column: usize) -> bool {
        self.pairs
            .contains(&RelationColumnPair::new(parent_column, child_column))
    }

    /// Returns the child column paired with `parent_column`.
    pub fn child_column_for(&self, parent_column: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|p| p.parent_column == parent_column)
            .map(|p| p.child_column)
    }

    pub fn greatest_parent_column(&self) -> Option<usize> {
        self.pairs.iter().map(|p| p.parent_column).max()
    }

    pub fn greatest_child_column(&self) -> Option<usize> {
        self.pairs.iter().map(|p| p.child_column).max()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn iter(&self) -> slice::Iter<'_, RelationColumnPair> {
        self.pairs.iter()
    }

    /// Builds the AND chain `child[c] == parent[p]` over all pairs.
    ///
    /// Returns `None` for a null key.
    pub fn to_filter(&self) -> Option<FilterExpr> {
        FilterExpr::and_all(self.pairs.iter().map(|p| {
            FilterExpr::eq(child_column(p.child_column), parent_column(p.parent_column))
        }))
    }
}

impl<'a> IntoIterator for &'a RelationKey {
    type Item = &'a RelationColumnPair;
    type IntoIter = slice::Iter<'a, RelationColumnPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Extracts the relation key of a filter.
///
/// Walks the top-level AND chain in textual order and keeps every equality
/// whose operands are one child column and one parent column (either way
/// round). Anything under an OR, comparisons with literals, inequalities and
/// LIKE clauses contribute nothing. A pair reusing a column already in the key
/// is skipped. A `None` filter yields an empty key.
pub fn extract_equality_pairs(expr: Option<&FilterExpr>) -> RelationKey {
    let mut key = RelationKey::new();
    if let Some(expr) = expr {
        collect_pairs(expr, &mut key);
    }
    key
}

fn collect_pairs(expr: &FilterExpr, key: &mut RelationKey) {
    match expr {
        FilterExpr::And(l, r) => {
            collect_pairs(l, key);
            collect_pairs(r, key);
        }
        FilterExpr::Compare {
            left,
            op: CompareOp::Eq,
            right,
        } => match (left, right) {
            (Operand::Child(c), Operand::Parent(p)) | (Operand::Parent(p), Operand::Child(c)) => {
                key.add_column_pair(*p, *c);
            }
            _ => {}
        },
        _ => {}
    }
}
