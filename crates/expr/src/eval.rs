//! Filter expression evaluation.

use crate::expr::{FilterExpr, Operand};
use alloc::borrow::Cow;
use alloc::format;
use tether_core::pattern_match::like;
use tether_core::{CaseSensitivity, Value};

/// Supplies the cells of the child row and parent row an expression is tested on.
pub trait EvalContext {
    /// Returns the child row's value in `column`, or `None` if out of range.
    fn child_value(&self, column: usize) -> Option<&Value>;

    /// Returns the parent row's value in `column`, or `None` if out of range.
    fn parent_value(&self, column: usize) -> Option<&Value>;
}

/// An `EvalContext` over two rows held as slices.
#[derive(Clone, Copy, Debug)]
pub struct SliceRows<'a> {
    pub child: &'a [Value],
    pub parent: &'a [Value],
}

impl<'a> SliceRows<'a> {
    pub fn new(child: &'a [Value], parent: &'a [Value]) -> Self {
        Self { child, parent }
    }
}

impl EvalContext for SliceRows<'_> {
    fn child_value(&self, column: usize) -> Option<&Value> {
        self.child.get(column)
    }

    fn parent_value(&self, column: usize) -> Option<&Value> {
        self.parent.get(column)
    }
}

fn resolve<'a, C: EvalContext + ?Sized>(operand: &'a Operand, ctx: &'a C) -> Option<&'a Value> {
    match operand {
        Operand::Child(c) => ctx.child_value(*c),
        Operand::Parent(c) => ctx.parent_value(*c),
        Operand::Literal(v) => Some(v),
    }
}

fn text_of(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Boolean(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Int64(i) => Some(Cow::Owned(format!("{}", i))),
        Value::Float64(f) => Some(Cow::Owned(format!("{}", f))),
    }
}

/// Evaluates `expr` for one child row against one parent row.
///
/// A comparison is false when an operand refers to a column the row does not
/// have, or when either operand is Null. LIKE clauses match the textual form
/// of non-string values.
pub fn evaluate<C: EvalContext + ?Sized>(
    expr: &FilterExpr,
    ctx: &C,
    case: CaseSensitivity,
) -> bool {
    match expr {
        FilterExpr::Compare { left, op, right } => {
            match (resolve(left, ctx), resolve(right, ctx)) {
                (Some(l), Some(r)) => l.compare(r, case).map_or(false, |o| op.matches(o)),
                _ => false,
            }
        }
        FilterExpr::Like { operand, pattern } => resolve(operand, ctx)
            .and_then(text_of)
            .map_or(false, |text| like(&text, pattern, case)),
        FilterExpr::And(l, r) => evaluate(l, ctx, case) && evaluate(r, ctx, case),
        FilterExpr::Or(l, r) => evaluate(l, ctx, case) || evaluate(r, ctx, case),
    }
}
