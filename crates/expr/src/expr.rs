//! Filter expression AST definitions.

use alloc::boxed::Box;
use alloc::string::String;
use core::cmp::Ordering;
use hashbrown::HashSet;
use tether_core::Value;

/// One side of a comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A column of the child row being tested.
    Child(usize),
    /// A column of the current parent row.
    Parent(usize),
    /// A constant.
    Literal(Value),
}

/// Creates a child column operand.
pub fn child_column(index: usize) -> Operand {
    Operand::Child(index)
}

/// Creates a parent column operand.
pub fn parent_column(index: usize) -> Operand {
    Operand::Parent(index)
}

/// Creates a literal operand.
pub fn literal(value: impl Into<Value>) -> Operand {
    Operand::Literal(value.into())
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Returns true if `ordering` of left against right satisfies this operator.
    #[inline]
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Filter expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    /// `left op right`.
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    /// Wildcard match of `operand` against `pattern` (`*` and `?`).
    Like { operand: Operand, pattern: String },
    /// Both sides hold.
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// At least one side holds.
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    /// Creates a comparison expression.
    pub fn compare(left: Operand, op: CompareOp, right: Operand) -> Self {
        FilterExpr::Compare { left, op, right }
    }

    /// Creates an equality expression.
    pub fn eq(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Eq, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Ne, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Le, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Operand, right: Operand) -> Self {
        Self::compare(left, CompareOp::Ge, right)
    }

    /// Creates a wildcard match expression.
    pub fn like(operand: Operand, pattern: impl Into<String>) -> Self {
        FilterExpr::Like {
            operand,
            pattern: pattern.into(),
        }
    }

    /// Combines with `other` using AND.
    pub fn and(self, other: FilterExpr) -> Self {
        FilterExpr::And(Box::new(self), Box::new(other))
    }

    /// Combines with `other` using OR.
    pub fn or(self, other: FilterExpr) -> Self {
        FilterExpr::Or(Box::new(self), Box::new(other))
    }

    /// Left-folds `exprs` into an AND chain. Returns `None` for no expressions.
    pub fn and_all(exprs: impl IntoIterator<Item = FilterExpr>) -> Option<Self> {
        exprs.into_iter().reduce(FilterExpr::and)
    }

    fn for_each_operand<'a>(&'a self, f: &mut impl FnMut(&'a Operand)) {
        match self {
            FilterExpr::Compare { left, right, .. } => {
                f(left);
                f(right);
            }
            FilterExpr::Like { operand, .. } => f(operand),
            FilterExpr::And(l, r) | FilterExpr::Or(l, r) => {
                l.for_each_operand(f);
                r.for_each_operand(f);
            }
        }
    }

    /// Returns the child columns this expression reads.
    pub fn referenced_child_columns(&self) -> HashSet<usize> {
        let mut columns = HashSet::new();
        self.for_each_operand(&mut |op| {
            if let Operand::Child(c) = op {
                columns.insert(*c);
            }
        });
        columns
    }

    /// Returns the parent columns this expression reads.
    pub fn referenced_parent_columns(&self) -> HashSet<usize> {
        let mut columns = HashSet::new();
        self.for_each_operand(&mut |op| {
            if let Operand::Parent(c) = op {
                columns.insert(*c);
            }
        });
        columns
    }

    /// Returns the greatest child column referenced, if any.
    pub fn greatest_child_column(&self) -> Option<usize> {
        let mut greatest = None;
        self.for_each_operand(&mut |op| {
            if let Operand::Child(c) = op {
                greatest = greatest.max(Some(*c));
            }
        });
        greatest
    }

    /// Returns the greatest parent column referenced, if any.
    pub fn greatest_parent_column(&self) -> Option<usize> {
        let mut greatest = None;
        self.for_each_operand(&mut |op| {
            if let Operand::Parent(c) = op {
                greatest = greatest.max(Some(*c));
            }
        });
        greatest
    }
}
