use indexmap::IndexMap;
use motif_core::{Constant, DataType, Path};
use serde::{Deserialize, Serialize};

use super::{BoolExpr, BoundaryEdge, Expr, MatchDef, ValueExpr};
use crate::diagnostics::Span;

/// Ordered statements sharing one global namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(skip)]
    pub span: Span,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            span: Span::default(),
            statements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Query(Query),
    View(View),
    Funnel(Funnel),
    Segment(Segment),
}

impl Statement {
    pub fn name(&self) -> Option<&str> {
        match self {
            Statement::Query(q) => q.name.as_deref(),
            Statement::View(v) => Some(&v.name),
            Statement::Funnel(f) => Some(&f.name),
            Statement::Segment(s) => Some(&s.name),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::Query(_) => "QUERY",
            Statement::View(_) => "VIEW",
            Statement::Funnel(_) => "FUNNEL",
            Statement::Segment(_) => "SEGMENT",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Query(q) => q.span,
            Statement::View(v) => v.span,
            Statement::Funnel(f) => f.span,
            Statement::Segment(s) => s.span,
        }
    }

    pub fn parameters(&self) -> &[ParameterDecl] {
        match self {
            Statement::Query(q) => &q.parameters,
            Statement::View(v) => &v.parameters,
            Statement::Funnel(f) => &f.parameters,
            Statement::Segment(s) => &s.parameters,
        }
    }
}

/// `$name TYPE [DEFAULT value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    pub dtype: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Constant>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            dtype,
            default: None,
        }
    }

    pub fn with_default(mut self, value: Constant) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(skip)]
    pub span: Span,
    pub expr: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Analytic query: selections grouped and filtered per entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(skip)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    pub selections: Vec<Selection>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<BoolExpr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<ValueExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<ValueExpr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Query {
    pub fn select(mut self, expr: impl Into<Expr>, alias: Option<&str>) -> Self {
        self.selections.push(Selection {
            span: Span::default(),
            expr: expr.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    pub fn with_where(mut self, condition: BoolExpr) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Named reusable filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    pub filter: BoolExpr,
}

impl View {
    pub fn new(name: impl Into<String>, filter: BoolExpr) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            parameters: Vec::new(),
            filter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunnelType {
    Conversion,
    Transaction,
}

impl FunnelType {
    pub fn keyword(self) -> &'static str {
        match self {
            FunnelType::Conversion => "CONVERSION",
            FunnelType::Transaction => "TRANSACTION",
        }
    }
}

/// Timing constraints of a triggered step. Bind fills the gaps: `timing`
/// from the nearest ordinal field, `within`/`after` with `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(skip)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<ValueExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<ValueExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<ValueExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(skip)]
    pub span: Span,
    pub id: i64,
    pub when: BoolExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
}

impl StepDefinition {
    pub fn new(id: i64, when: BoolExpr) -> Self {
        Self {
            span: Span::default(),
            id,
            when,
            trigger: None,
        }
    }

    pub fn triggered(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

/// Multi-step conversion or transaction funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(rename = "type")]
    pub funnel_type: FunnelType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(with = "step_list")]
    pub steps: IndexMap<i64, StepDefinition>,
    #[serde(rename = "match")]
    pub pattern: MatchDef,
    /// Occurrence window in milliseconds; `0` is unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<ValueExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<ValueExpr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub source_paths: Vec<Path>,
}

impl Funnel {
    pub fn new(name: impl Into<String>, funnel_type: FunnelType, pattern: MatchDef) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            funnel_type,
            parameters: Vec::new(),
            sources: Vec::new(),
            steps: IndexMap::new(),
            pattern,
            within: None,
            limit: None,
            tags: Vec::new(),
            source_paths: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.insert(step.id, step);
        self
    }

    /// Add a step whose `when` is the start or end of `relation`.
    ///
    /// Returns the assigned id, the next free negative id.
    pub fn add_boundary_step(&mut self, edge: BoundaryEdge, relation: impl Into<String>) -> i64 {
        self.add_untriggered_step(BoolExpr::boundary(edge, relation))
    }

    /// Add a step without trigger under the next free negative id.
    pub fn add_untriggered_step(&mut self, when: BoolExpr) -> i64 {
        let id = self.next_synthetic_id();
        self.steps.insert(id, StepDefinition::new(id, when));
        id
    }

    fn next_synthetic_id(&self) -> i64 {
        self.steps
            .keys()
            .copied()
            .filter(|id| *id < 0)
            .min()
            .map_or(-1, |lowest| lowest - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(rename = "where")]
    pub condition: BoolExpr,
}

impl SegmentDefinition {
    pub fn new(name: impl Into<String>, condition: BoolExpr) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            condition,
        }
    }
}

/// Ordered, mutually exclusive membership rules; the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub definitions: Vec<SegmentDefinition>,
    #[serde(skip)]
    pub source_paths: Vec<Path>,
}

impl Segment {
    pub fn new(name: impl Into<String>, definitions: Vec<SegmentDefinition>) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            parameters: Vec::new(),
            sources: Vec::new(),
            definitions,
            source_paths: Vec::new(),
        }
    }
}

/// Steps travel as a list; the map key is each step's own id.
mod step_list {
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::StepDefinition;

    pub fn serialize<S: Serializer>(
        steps: &IndexMap<i64, StepDefinition>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(steps.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<i64, StepDefinition>, D::Error> {
        let steps = Vec::<StepDefinition>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(steps.len());
        for step in steps {
            let id = step.id;
            if map.insert(id, step).is_some() {
                return Err(D::Error::custom(format!("duplicate step id {id}")));
            }
        }
        Ok(map)
    }
}
