use std::fmt::{self, Write};

use motif_core::utils::quote;
use motif_core::{Constant, DataType};

use super::indent;
use crate::ast::{
    Aggregation, AggregationOp, BoolExpr, BoundsOp, Expr, ExprRef, Funnel, ListOp, MatchDef,
    MembershipSet, NullTestOp, ParameterDecl, Program, Query, Segment, Statement, StepDefinition,
    ValueExpr, View,
};

/// Canonical Motif text.
///
/// Expressions and patterns render on one line and ignore `level`;
/// statements render one clause per line, indented by `level`.
pub trait Motif {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result;

    fn generate_motif(&self, level: usize) -> String {
        let mut out = String::new();
        self.write_motif(&mut out, level)
            .expect("String write never fails");
        out
    }
}

/// Literal text of a constant.
///
/// Types without a literal form of their own travel inside a `CAST`.
pub fn constant_text(value: &Constant) -> String {
    fn signed(text: String, negative: bool) -> String {
        if negative { format!("({text})") } else { text }
    }
    fn cast(text: String, dtype: DataType) -> String {
        format!("CAST({text} AS {dtype})")
    }

    match value {
        Constant::Boolean(true) => "TRUE".to_string(),
        Constant::Boolean(false) => "FALSE".to_string(),
        Constant::Null => "NULL".to_string(),
        Constant::String(s) => quote(s),
        Constant::Integer(v) => signed(v.to_string(), *v < 0),
        Constant::Byte(v) => cast(signed(v.to_string(), *v < 0), DataType::Byte),
        Constant::Short(v) => cast(signed(v.to_string(), *v < 0), DataType::Short),
        Constant::Long(v) => {
            let text = signed(v.to_string(), *v < 0);
            if i32::try_from(*v).is_ok() {
                cast(text, DataType::Long)
            } else {
                text
            }
        }
        Constant::Datetime(ms) => cast(signed(ms.to_string(), *ms < 0), DataType::Datetime),
        Constant::Double(v) if v.is_nan() => cast(quote("NaN"), DataType::Double),
        Constant::Double(v) if v.is_infinite() => {
            let text = if *v > 0.0 { "inf" } else { "-inf" };
            cast(quote(text), DataType::Double)
        }
        Constant::Double(v) => signed(format!("{v:?}"), v.is_sign_negative()),
    }
}

fn write_list<T>(
    w: &mut dyn Write,
    items: &[T],
    separator: &str,
    mut item: impl FnMut(&mut dyn Write, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, value) in items.iter().enumerate() {
        if i > 0 {
            w.write_str(separator)?;
        }
        item(w, value)?;
    }
    Ok(())
}

impl Motif for ExprRef<'_> {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        match self {
            ExprRef::Bool(b) => b.write_motif(w, level),
            ExprRef::Value(v) => v.write_motif(w, level),
        }
    }
}

impl Motif for Expr {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        self.as_ref().write_motif(w, level)
    }
}

impl Motif for BoolExpr {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        match self {
            BoolExpr::Constant(node) => w.write_str(&constant_text(&node.value)),
            BoolExpr::Binary(node) => {
                w.write_char('(')?;
                node.left.write_motif(w, level)?;
                write!(w, " {} ", node.op.keyword())?;
                node.right.write_motif(w, level)?;
                w.write_char(')')
            }
            BoolExpr::Not(node) => {
                w.write_str("(NOT ")?;
                node.operand.write_motif(w, level)?;
                w.write_char(')')
            }
            BoolExpr::Comparison(node) => {
                w.write_char('(')?;
                node.left.write_motif(w, level)?;
                write!(w, " {} ", node.op.symbol())?;
                node.right.write_motif(w, level)?;
                w.write_char(')')
            }
            BoolExpr::Bounds(node) => {
                w.write_char('(')?;
                node.value.write_motif(w, level)?;
                w.write_str(match node.op {
                    BoundsOp::Between => " BETWEEN ",
                    BoundsOp::NotBetween => " NOT BETWEEN ",
                })?;
                node.lower.write_motif(w, level)?;
                w.write_str(" AND ")?;
                node.upper.write_motif(w, level)?;
                w.write_char(')')
            }
            BoolExpr::NullTest(node) => {
                w.write_char('(')?;
                node.operand.write_motif(w, level)?;
                w.write_str(match node.op {
                    NullTestOp::IsNull => " IS NULL)",
                    NullTestOp::IsNotNull => " IS NOT NULL)",
                })
            }
            BoolExpr::Membership(node) => {
                w.write_char('(')?;
                node.value.write_motif(w, level)?;
                w.write_str(" IN ")?;
                match &node.set {
                    MembershipSet::List(items) => {
                        w.write_char('(')?;
                        write_list(w, items, ", ", |w, item| item.write_motif(w, level))?;
                        w.write_char(')')?;
                    }
                    MembershipSet::Vector(vector) => vector.write_motif(w, level)?,
                }
                w.write_char(')')
            }
            BoolExpr::ValueWrapper(node) => node.value.write_motif(w, level),
            BoolExpr::Boundary(node) => write!(w, "{}({})", node.edge.keyword(), node.relation),
            BoolExpr::StepReference(node) => write!(w, "STEP({})", node.step),
        }
    }
}

impl Motif for ValueExpr {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        match self {
            ValueExpr::Constant(node) => w.write_str(&constant_text(&node.value)),
            ValueExpr::Path(node) => w.write_str(&node.name),
            ValueExpr::Parameter(node) => write!(w, "${}", node.name),
            ValueExpr::Binary(node) => {
                w.write_char('(')?;
                node.left.write_motif(w, level)?;
                write!(w, " {} ", node.op.symbol())?;
                node.right.write_motif(w, level)?;
                w.write_char(')')
            }
            ValueExpr::Unary(node) => {
                write!(w, "({}", node.op.symbol())?;
                node.operand.write_motif(w, level)?;
                w.write_char(')')
            }
            ValueExpr::Cast(node) => {
                w.write_str("CAST(")?;
                node.operand.write_motif(w, level)?;
                write!(w, " AS {})", node.target)
            }
            ValueExpr::DateTimeConversion(node) => {
                write!(w, "{}(", node.conversion.keyword())?;
                node.operand.write_motif(w, level)?;
                w.write_char(')')
            }
            ValueExpr::DateTimeQuantum(node) => {
                write!(
                    w,
                    "{}({}, ",
                    node.quantum.keyword(),
                    node.quantum.unit_keyword()
                )?;
                node.operand.write_motif(w, level)?;
                if let Some(zone) = &node.zone {
                    write!(w, ", {}", quote(zone))?;
                }
                w.write_char(')')
            }
            ValueExpr::FunctionCall(node) => {
                write!(w, "{}(", node.name)?;
                write_list(w, &node.args, ", ", |w, arg| arg.write_motif(w, level))?;
                w.write_char(')')
            }
            ValueExpr::Aggregation(node) => write_aggregation(w, node, level),
            ValueExpr::Now(_) => w.write_str("NOW()"),
        }
    }
}

fn write_aggregation(w: &mut dyn Write, node: &Aggregation, level: usize) -> fmt::Result {
    write!(w, "{}(", node.op.keyword())?;
    if node.op == AggregationOp::Top
        && let Some(count) = &node.count
    {
        count.write_motif(w, level)?;
        w.write_str(", ")?;
    }
    node.target.write_motif(w, level)?;
    if let Some(condition) = &node.condition {
        w.write_str(" WHERE ")?;
        condition.write_motif(w, level)?;
    }
    if let Some(scope) = &node.scope {
        write!(w, " SCOPE {scope}")?;
    }
    if let Some(quanta) = &node.quanta {
        w.write_str(" QUANTA ")?;
        quanta.write_motif(w, level)?;
    }
    w.write_char(')')
}

impl Motif for MatchDef {
    fn write_motif(&self, w: &mut dyn Write, _level: usize) -> fmt::Result {
        write_match(w, self, true, false)
    }
}

/// `(?: ...)` opens where capture stops; it covers the whole subtree.
fn write_match(
    w: &mut dyn Write,
    node: &MatchDef,
    parent_capturing: bool,
    nested: bool,
) -> fmt::Result {
    let opens_group = parent_capturing && !node.capturing();
    match node {
        MatchDef::Repeat(repeat) => {
            if opens_group {
                w.write_str("(?:")?;
                write_match(w, &repeat.child, false, false)?;
                w.write_char(')')?;
            } else {
                write_match(w, &repeat.child, repeat.capturing, true)?;
            }
            write_quantifier(w, repeat.min, repeat.max)
        }
        _ if opens_group => {
            w.write_str("(?:")?;
            write_match(w, node, false, false)?;
            w.write_char(')')
        }
        MatchDef::Step(step) => write!(w, "{}", step.id),
        MatchDef::BracketSet(set) => {
            if set.negating {
                w.write_char('^')?;
            }
            w.write_char('[')?;
            write_list(w, &set.steps, " ", |w, id| write!(w, "{id}"))?;
            w.write_char(']')
        }
        MatchDef::List(list) => {
            if nested {
                w.write_char('(')?;
            }
            let separator = match list.op {
                ListOp::And => ":",
                ListOp::Or => " | ",
            };
            write_list(w, &list.items, separator, |w, item| {
                write_match(w, item, list.capturing, true)
            })?;
            if nested {
                w.write_char(')')?;
            }
            Ok(())
        }
    }
}

fn write_quantifier(w: &mut dyn Write, min: i64, max: Option<i64>) -> fmt::Result {
    match (min, max) {
        (0, None) => w.write_char('*'),
        (1, None) => w.write_char('+'),
        (0, Some(1)) => w.write_char('?'),
        (min, None) => write!(w, "{{{min},*}}"),
        (min, Some(max)) if min == max => write!(w, "{{{min}}}"),
        (min, Some(max)) => write!(w, "{{{min},{max}}}"),
    }
}

impl Motif for Program {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            statement.write_motif(w, level)?;
        }
        Ok(())
    }
}

impl Motif for Statement {
    fn write_motif(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        match self {
            Statement::Query(query) => write_query(w, query, level),
            Statement::View(view) => write_view(w, view, level),
            Statement::Funnel(funnel) => write_funnel(w, funnel, level),
            Statement::Segment(segment) => write_segment(w, segment, level),
        }
    }
}

fn write_parameters(w: &mut dyn Write, parameters: &[ParameterDecl], pad: &str) -> fmt::Result {
    if parameters.is_empty() {
        return Ok(());
    }
    write!(w, "{pad}PARAMETERS ")?;
    write_list(w, parameters, ", ", |w, parameter| {
        write!(w, "${} {}", parameter.name, parameter.dtype)?;
        if let Some(default) = &parameter.default {
            write!(w, " DEFAULT {}", constant_text(default))?;
        }
        Ok(())
    })?;
    w.write_char('\n')
}

fn write_names(w: &mut dyn Write, keyword: &str, names: &[String], pad: &str) -> fmt::Result {
    if names.is_empty() {
        return Ok(());
    }
    write!(w, "{pad}{keyword} {}", names.join(", "))?;
    w.write_char('\n')
}

fn write_tags(w: &mut dyn Write, tags: &[String], pad: &str) -> fmt::Result {
    if tags.is_empty() {
        return Ok(());
    }
    write!(w, "{pad}TAGS ")?;
    write_list(w, tags, ", ", |w, tag| w.write_str(&quote(tag)))?;
    w.write_char('\n')
}

fn write_clause(
    w: &mut dyn Write,
    pad: &str,
    keyword: &str,
    value: &dyn Motif,
    level: usize,
) -> fmt::Result {
    write!(w, "{pad}{keyword} ")?;
    value.write_motif(w, level)?;
    w.write_char('\n')
}

fn write_query(w: &mut dyn Write, query: &Query, level: usize) -> fmt::Result {
    let pad = indent(level + 1);
    w.write_str(&indent(level))?;
    match &query.name {
        Some(name) => writeln!(w, "QUERY {name}")?,
        None => writeln!(w, "QUERY")?,
    }
    write_parameters(w, &query.parameters, &pad)?;
    write!(w, "{pad}SELECT ")?;
    write_list(w, &query.selections, ", ", |w, selection| {
        selection.expr.write_motif(w, level)?;
        if let Some(alias) = &selection.alias {
            write!(w, " AS {alias}")?;
        }
        Ok(())
    })?;
    w.write_char('\n')?;
    if let Some(condition) = &query.condition {
        write_clause(w, &pad, "WHERE", condition, level)?;
    }
    if !query.group_by.is_empty() {
        write!(w, "{pad}GROUP BY ")?;
        write_list(w, &query.group_by, ", ", |w, key| key.write_motif(w, level))?;
        w.write_char('\n')?;
    }
    if let Some(limit) = &query.limit {
        write_clause(w, &pad, "LIMIT", limit, level)?;
    }
    write_tags(w, &query.tags, &pad)
}

fn write_view(w: &mut dyn Write, view: &View, level: usize) -> fmt::Result {
    let pad = indent(level + 1);
    writeln!(w, "{}VIEW {}", indent(level), view.name)?;
    write_parameters(w, &view.parameters, &pad)?;
    write_clause(w, &pad, "WHERE", &view.filter, level)
}

fn write_step(w: &mut dyn Write, step: &StepDefinition, pad: &str, level: usize) -> fmt::Result {
    write!(w, "{pad}STEP {} WHEN ", step.id)?;
    step.when.write_motif(w, level)?;
    if let Some(trigger) = &step.trigger {
        w.write_str(" TRIGGER")?;
        let parts = [
            ("TIMING", &trigger.timing),
            ("WITHIN", &trigger.within),
            ("AFTER", &trigger.after),
        ];
        for (keyword, value) in parts {
            if let Some(value) = value {
                write!(w, " {keyword} ")?;
                value.write_motif(w, level)?;
            }
        }
    }
    w.write_char('\n')
}

fn write_funnel(w: &mut dyn Write, funnel: &Funnel, level: usize) -> fmt::Result {
    let pad = indent(level + 1);
    writeln!(
        w,
        "{}FUNNEL {} {}",
        indent(level),
        funnel.name,
        funnel.funnel_type.keyword()
    )?;
    write_parameters(w, &funnel.parameters, &pad)?;
    write_names(w, "SOURCES", &funnel.sources, &pad)?;
    for step in funnel.steps.values() {
        write_step(w, step, &pad, level)?;
    }
    write_clause(w, &pad, "MATCH", &funnel.pattern, level)?;
    if let Some(within) = &funnel.within {
        write_clause(w, &pad, "WITHIN", within, level)?;
    }
    if let Some(limit) = &funnel.limit {
        write_clause(w, &pad, "LIMIT", limit, level)?;
    }
    write_tags(w, &funnel.tags, &pad)
}

fn write_segment(w: &mut dyn Write, segment: &Segment, level: usize) -> fmt::Result {
    let pad = indent(level + 1);
    writeln!(w, "{}SEGMENT {}", indent(level), segment.name)?;
    write_parameters(w, &segment.parameters, &pad)?;
    write_names(w, "SOURCES", &segment.sources, &pad)?;
    for definition in &segment.definitions {
        write!(w, "{pad}DEFINE {} WHERE ", quote(&definition.name))?;
        definition.condition.write_motif(w, level)?;
        w.write_char('\n')?;
    }
    Ok(())
}
