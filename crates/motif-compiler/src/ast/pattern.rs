use serde::{Deserialize, Serialize};

use crate::diagnostics::Span;

fn capturing_default() -> bool {
    true
}

fn is_capturing(value: &bool) -> bool {
    *value
}

/// Funnel match definition: a regular pattern over step ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchDef {
    Step(MatchStep),
    List(MatchList),
    Repeat(MatchRepeat),
    BracketSet(BracketSet),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStep {
    #[serde(skip)]
    pub span: Span,
    pub id: i64,
    #[serde(default = "capturing_default", skip_serializing_if = "is_capturing")]
    pub capturing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListOp {
    /// Sequence, written `a:b`.
    And,
    /// Alternation, written `a | b`.
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchList {
    #[serde(skip)]
    pub span: Span,
    pub op: ListOp,
    pub items: Vec<MatchDef>,
    #[serde(default = "capturing_default", skip_serializing_if = "is_capturing")]
    pub capturing: bool,
}

/// `child{min,max}`; `max == None` is unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRepeat {
    #[serde(skip)]
    pub span: Span,
    pub min: i64,
    pub max: Option<i64>,
    pub child: Box<MatchDef>,
    #[serde(default = "capturing_default", skip_serializing_if = "is_capturing")]
    pub capturing: bool,
}

/// `[1 2 3]` matches any listed step, `^[1 2]` any step not listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSet {
    #[serde(skip)]
    pub span: Span,
    pub negating: bool,
    pub steps: Vec<i64>,
    #[serde(default = "capturing_default", skip_serializing_if = "is_capturing")]
    pub capturing: bool,
}

impl MatchDef {
    pub fn step(id: i64) -> Self {
        MatchDef::Step(MatchStep {
            span: Span::default(),
            id,
            capturing: true,
        })
    }

    pub fn seq(items: Vec<MatchDef>) -> Self {
        Self::list(ListOp::And, items)
    }

    pub fn alt(items: Vec<MatchDef>) -> Self {
        Self::list(ListOp::Or, items)
    }

    pub fn list(op: ListOp, items: Vec<MatchDef>) -> Self {
        MatchDef::List(MatchList {
            span: Span::default(),
            op,
            items,
            capturing: true,
        })
    }

    pub fn repeat(child: MatchDef, min: i64, max: Option<i64>) -> Self {
        MatchDef::Repeat(MatchRepeat {
            span: Span::default(),
            min,
            max,
            child: Box::new(child),
            capturing: true,
        })
    }

    pub fn bracket(negating: bool, steps: Vec<i64>) -> Self {
        MatchDef::BracketSet(BracketSet {
            span: Span::default(),
            negating,
            steps,
            capturing: true,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            MatchDef::Step(n) => n.span,
            MatchDef::List(n) => n.span,
            MatchDef::Repeat(n) => n.span,
            MatchDef::BracketSet(n) => n.span,
        }
    }

    pub fn capturing(&self) -> bool {
        match self {
            MatchDef::Step(n) => n.capturing,
            MatchDef::List(n) => n.capturing,
            MatchDef::Repeat(n) => n.capturing,
            MatchDef::BracketSet(n) => n.capturing,
        }
    }

    pub fn set_capturing(&mut self, capturing: bool) {
        match self {
            MatchDef::Step(n) => n.capturing = capturing,
            MatchDef::List(n) => n.capturing = capturing,
            MatchDef::Repeat(n) => n.capturing = capturing,
            MatchDef::BracketSet(n) => n.capturing = capturing,
        }
    }

    /// Mark this node and every descendant non-capturing, as `(?: ...)` does.
    pub fn mark_non_capturing(&mut self) {
        self.set_capturing(false);
        match self {
            MatchDef::List(list) => list.items.iter_mut().for_each(MatchDef::mark_non_capturing),
            MatchDef::Repeat(repeat) => repeat.child.mark_non_capturing(),
            MatchDef::Step(_) | MatchDef::BracketSet(_) => {}
        }
    }

    /// Every step id mentioned, leaves and bracket members alike.
    pub fn step_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        self.collect_step_ids(&mut ids);
        ids
    }

    fn collect_step_ids(&self, ids: &mut Vec<i64>) {
        match self {
            MatchDef::Step(step) => ids.push(step.id),
            MatchDef::List(list) => list.items.iter().for_each(|i| i.collect_step_ids(ids)),
            MatchDef::Repeat(repeat) => repeat.child.collect_step_ids(ids),
            MatchDef::BracketSet(set) => ids.extend(&set.steps),
        }
    }
}
