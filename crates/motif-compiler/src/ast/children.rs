//! Generic child protocol over both expression families.
//!
//! Children are numbered in source order. Slots are typed: a value slot only
//! accepts a [`ValueExpr`], a predicate slot only a [`BoolExpr`].

use std::mem;

use super::{BoolExpr, Expr, MembershipSet, ValueExpr};

#[derive(Debug, Clone, Copy)]
pub enum ExprRef<'a> {
    Bool(&'a BoolExpr),
    Value(&'a ValueExpr),
}

#[derive(Debug)]
pub enum ExprMut<'a> {
    Bool(&'a mut BoolExpr),
    Value(&'a mut ValueExpr),
}

impl BoolExpr {
    pub(crate) fn slots(&self) -> Vec<ExprRef<'_>> {
        match self {
            BoolExpr::Constant(_) | BoolExpr::Boundary(_) | BoolExpr::StepReference(_) => vec![],
            BoolExpr::Binary(n) => vec![ExprRef::Bool(&n.left), ExprRef::Bool(&n.right)],
            BoolExpr::Not(n) => vec![ExprRef::Bool(&n.operand)],
            BoolExpr::Comparison(n) => vec![ExprRef::Value(&n.left), ExprRef::Value(&n.right)],
            BoolExpr::Bounds(n) => vec![
                ExprRef::Value(&n.value),
                ExprRef::Value(&n.lower),
                ExprRef::Value(&n.upper),
            ],
            BoolExpr::NullTest(n) => vec![ExprRef::Value(&n.operand)],
            BoolExpr::Membership(n) => {
                let mut slots = vec![ExprRef::Value(&n.value)];
                match &n.set {
                    MembershipSet::List(items) => slots.extend(items.iter().map(ExprRef::Value)),
                    MembershipSet::Vector(vector) => slots.push(ExprRef::Value(vector)),
                }
                slots
            }
            BoolExpr::ValueWrapper(n) => vec![ExprRef::Value(&n.value)],
        }
    }

    pub(crate) fn slots_mut(&mut self) -> Vec<ExprMut<'_>> {
        match self {
            BoolExpr::Constant(_) | BoolExpr::Boundary(_) | BoolExpr::StepReference(_) => vec![],
            BoolExpr::Binary(n) => vec![ExprMut::Bool(&mut n.left), ExprMut::Bool(&mut n.right)],
            BoolExpr::Not(n) => vec![ExprMut::Bool(&mut n.operand)],
            BoolExpr::Comparison(n) => {
                vec![ExprMut::Value(&mut n.left), ExprMut::Value(&mut n.right)]
            }
            BoolExpr::Bounds(n) => vec![
                ExprMut::Value(&mut n.value),
                ExprMut::Value(&mut n.lower),
                ExprMut::Value(&mut n.upper),
            ],
            BoolExpr::NullTest(n) => vec![ExprMut::Value(&mut n.operand)],
            BoolExpr::Membership(n) => {
                let mut slots = vec![ExprMut::Value(&mut n.value)];
                match &mut n.set {
                    MembershipSet::List(items) => {
                        slots.extend(items.iter_mut().map(ExprMut::Value))
                    }
                    MembershipSet::Vector(vector) => slots.push(ExprMut::Value(vector)),
                }
                slots
            }
            BoolExpr::ValueWrapper(n) => vec![ExprMut::Value(&mut n.value)],
        }
    }

    pub fn child_count(&self) -> usize {
        self.slots().len()
    }

    pub fn child(&self, index: usize) -> Option<ExprRef<'_>> {
        self.slots().into_iter().nth(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<ExprMut<'_>> {
        self.slots_mut().into_iter().nth(index)
    }
}

impl ValueExpr {
    pub(crate) fn slots(&self) -> Vec<ExprRef<'_>> {
        match self {
            ValueExpr::Constant(_)
            | ValueExpr::Path(_)
            | ValueExpr::Parameter(_)
            | ValueExpr::Now(_) => vec![],
            ValueExpr::Binary(n) => vec![ExprRef::Value(&n.left), ExprRef::Value(&n.right)],
            ValueExpr::Unary(n) => vec![ExprRef::Value(&n.operand)],
            ValueExpr::Cast(n) => vec![ExprRef::Value(&n.operand)],
            ValueExpr::DateTimeConversion(n) => vec![ExprRef::Value(&n.operand)],
            ValueExpr::DateTimeQuantum(n) => vec![ExprRef::Value(&n.operand)],
            ValueExpr::FunctionCall(n) => n.args.iter().map(ExprRef::Value).collect(),
            ValueExpr::Aggregation(n) => {
                let mut slots = Vec::with_capacity(4);
                slots.extend(n.count.as_deref().map(ExprRef::Value));
                slots.push(ExprRef::Value(&n.target));
                slots.extend(n.condition.as_deref().map(ExprRef::Bool));
                slots.extend(n.quanta.as_deref().map(ExprRef::Value));
                slots
            }
        }
    }

    pub(crate) fn slots_mut(&mut self) -> Vec<ExprMut<'_>> {
        match self {
            ValueExpr::Constant(_)
            | ValueExpr::Path(_)
            | ValueExpr::Parameter(_)
            | ValueExpr::Now(_) => vec![],
            ValueExpr::Binary(n) => {
                vec![ExprMut::Value(&mut n.left), ExprMut::Value(&mut n.right)]
            }
            ValueExpr::Unary(n) => vec![ExprMut::Value(&mut n.operand)],
            ValueExpr::Cast(n) => vec![ExprMut::Value(&mut n.operand)],
            ValueExpr::DateTimeConversion(n) => vec![ExprMut::Value(&mut n.operand)],
            ValueExpr::DateTimeQuantum(n) => vec![ExprMut::Value(&mut n.operand)],
            ValueExpr::FunctionCall(n) => n.args.iter_mut().map(ExprMut::Value).collect(),
            ValueExpr::Aggregation(n) => {
                let mut slots = Vec::with_capacity(4);
                slots.extend(n.count.as_deref_mut().map(ExprMut::Value));
                slots.push(ExprMut::Value(&mut n.target));
                slots.extend(n.condition.as_deref_mut().map(ExprMut::Bool));
                slots.extend(n.quanta.as_deref_mut().map(ExprMut::Value));
                slots
            }
        }
    }

    pub fn child_count(&self) -> usize {
        self.slots().len()
    }

    pub fn child(&self, index: usize) -> Option<ExprRef<'_>> {
        self.slots().into_iter().nth(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<ExprMut<'_>> {
        self.slots_mut().into_iter().nth(index)
    }
}

impl Expr {
    pub fn child_count(&self) -> usize {
        match self {
            Expr::Bool(b) => b.child_count(),
            Expr::Value(v) => v.child_count(),
        }
    }

    pub fn child(&self, index: usize) -> Option<ExprRef<'_>> {
        match self {
            Expr::Bool(b) => b.child(index),
            Expr::Value(v) => v.child(index),
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<ExprMut<'_>> {
        match self {
            Expr::Bool(b) => b.child_mut(index),
            Expr::Value(v) => v.child_mut(index),
        }
    }

    /// Replace child `index`, returning the previous occupant.
    ///
    /// The offered node comes back as `Err` when the slot does not exist or
    /// holds the other expression family.
    pub fn set_child(&mut self, index: usize, child: Expr) -> Result<Expr, Expr> {
        match (self.child_mut(index), child) {
            (Some(ExprMut::Bool(slot)), Expr::Bool(new)) => Ok(Expr::Bool(mem::replace(slot, new))),
            (Some(ExprMut::Value(slot)), Expr::Value(new)) => {
                Ok(Expr::Value(mem::replace(slot, new)))
            }
            (_, offered) => Err(offered),
        }
    }
}

impl<'a> ExprRef<'a> {
    pub fn span(self) -> crate::diagnostics::Span {
        match self {
            ExprRef::Bool(b) => b.span(),
            ExprRef::Value(v) => v.span(),
        }
    }

    pub fn children(self) -> Vec<ExprRef<'a>> {
        match self {
            ExprRef::Bool(b) => b.slots(),
            ExprRef::Value(v) => v.slots(),
        }
    }
}
