use std::fmt::{self, Write};

use super::indent;
use super::motif::Motif;
use crate::ast::{
    BoolExpr, BoundsOp, Expr, ExprRef, MatchDef, MembershipSet, NullTestOp, ParameterDecl,
    Program, Statement, ValueExpr,
};

/// Indented debug tree: one node per line, children one level deeper.
pub trait Explain {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result;

    fn explain(&self, level: usize) -> String {
        let mut out = String::new();
        self.write_explain(&mut out, level)
            .expect("String write never fails");
        out
    }
}

fn detail(expr: ExprRef<'_>) -> String {
    match expr {
        ExprRef::Bool(node) => match node {
            BoolExpr::Constant(c) => format!("{} {}", c.value.dtype(), c.value),
            BoolExpr::Binary(n) => n.op.keyword().to_string(),
            BoolExpr::Comparison(n) => n.op.symbol().to_string(),
            BoolExpr::Bounds(n) => match n.op {
                BoundsOp::Between => "BETWEEN".to_string(),
                BoundsOp::NotBetween => "NOT BETWEEN".to_string(),
            },
            BoolExpr::NullTest(n) => match n.op {
                NullTestOp::IsNull => "IS NULL".to_string(),
                NullTestOp::IsNotNull => "IS NOT NULL".to_string(),
            },
            BoolExpr::Membership(n) => match n.set {
                MembershipSet::List(_) => "list".to_string(),
                MembershipSet::Vector(_) => "vector".to_string(),
            },
            BoolExpr::Boundary(n) => match &n.resolved {
                Some(path) => format!("{} {} -> {path}", n.edge.keyword(), n.relation),
                None => format!("{} {}", n.edge.keyword(), n.relation),
            },
            BoolExpr::StepReference(n) => format!("step {}", n.step),
            BoolExpr::Not(_) | BoolExpr::ValueWrapper(_) => String::new(),
        },
        ExprRef::Value(node) => match node {
            ValueExpr::Constant(c) => format!("{} {}", c.value.dtype(), c.value),
            ValueExpr::Path(n) => match &n.resolved {
                Some(path) => format!("{} -> {path}", n.name),
                None => n.name.clone(),
            },
            ValueExpr::Parameter(n) => match n.dtype {
                Some(dtype) => format!("${} {dtype}", n.name),
                None => format!("${}", n.name),
            },
            ValueExpr::Binary(n) => n.op.symbol().to_string(),
            ValueExpr::Unary(n) => n.op.symbol().to_string(),
            ValueExpr::Cast(n) => format!("AS {}", n.target),
            ValueExpr::DateTimeConversion(n) => n.conversion.keyword().to_string(),
            ValueExpr::DateTimeQuantum(n) => {
                let mut text = format!("{} {}", n.quantum.keyword(), n.quantum.unit_keyword());
                if let Some(zone) = &n.zone {
                    text.push(' ');
                    text.push_str(zone);
                }
                text
            }
            ValueExpr::FunctionCall(n) => n.name.clone(),
            ValueExpr::Aggregation(n) => match &n.scope {
                Some(scope) => format!("{} scope={scope}", n.op.keyword()),
                None => n.op.keyword().to_string(),
            },
            ValueExpr::Now(_) => String::new(),
        },
    }
}

fn kind_name(expr: ExprRef<'_>) -> &'static str {
    match expr {
        ExprRef::Bool(b) => b.kind().name(),
        ExprRef::Value(v) => v.kind().name(),
    }
}

impl Explain for ExprRef<'_> {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        let detail = detail(*self);
        w.write_str(&indent(level))?;
        w.write_str(kind_name(*self))?;
        if !detail.is_empty() {
            write!(w, " {detail}")?;
        }
        w.write_char('\n')?;
        for child in self.children() {
            child.write_explain(w, level + 1)?;
        }
        Ok(())
    }
}

impl Explain for Expr {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        self.as_ref().write_explain(w, level)
    }
}

impl Explain for BoolExpr {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        ExprRef::Bool(self).write_explain(w, level)
    }
}

impl Explain for ValueExpr {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        ExprRef::Value(self).write_explain(w, level)
    }
}

impl Explain for MatchDef {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        w.write_str(&indent(level))?;
        match self {
            MatchDef::Step(step) => write!(w, "Step {}", step.id)?,
            MatchDef::List(list) => write!(w, "List {:?}", list.op)?,
            MatchDef::Repeat(repeat) => match repeat.max {
                Some(max) => write!(w, "Repeat {}..={max}", repeat.min)?,
                None => write!(w, "Repeat {}..", repeat.min)?,
            },
            MatchDef::BracketSet(set) => {
                let ids: Vec<String> = set.steps.iter().map(i64::to_string).collect();
                let prefix = if set.negating { "^" } else { "" };
                write!(w, "BracketSet {prefix}[{}]", ids.join(" "))?
            }
        }
        if !self.capturing() {
            w.write_str(" non-capturing")?;
        }
        w.write_char('\n')?;
        match self {
            MatchDef::List(list) => {
                for item in &list.items {
                    item.write_explain(w, level + 1)?;
                }
            }
            MatchDef::Repeat(repeat) => repeat.child.write_explain(w, level + 1)?,
            MatchDef::Step(_) | MatchDef::BracketSet(_) => {}
        }
        Ok(())
    }
}

/// `label:` line followed by the expression one level deeper.
fn labeled(w: &mut dyn Write, label: &str, expr: ExprRef<'_>, level: usize) -> fmt::Result {
    writeln!(w, "{}{label}:", indent(level))?;
    expr.write_explain(w, level + 1)
}

fn parameters(w: &mut dyn Write, parameters: &[ParameterDecl], level: usize) -> fmt::Result {
    for parameter in parameters {
        write!(w, "{}Parameter ${} {}", indent(level), parameter.name, parameter.dtype)?;
        if let Some(default) = &parameter.default {
            write!(w, " = {default}")?;
        }
        w.write_char('\n')?;
    }
    Ok(())
}

impl Explain for Statement {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        let inner = level + 1;
        match self {
            Statement::Query(query) => {
                writeln!(
                    w,
                    "{}Query {}",
                    indent(level),
                    query.name.as_deref().unwrap_or("<anonymous>")
                )?;
                parameters(w, &query.parameters, inner)?;
                for selection in &query.selections {
                    let label = match &selection.alias {
                        Some(alias) => format!("select {alias}"),
                        None => "select".to_string(),
                    };
                    labeled(w, &label, selection.expr.as_ref(), inner)?;
                }
                if let Some(condition) = &query.condition {
                    labeled(w, "where", ExprRef::Bool(condition), inner)?;
                }
                for key in &query.group_by {
                    labeled(w, "group by", ExprRef::Value(key), inner)?;
                }
                if let Some(limit) = &query.limit {
                    labeled(w, "limit", ExprRef::Value(limit), inner)?;
                }
            }
            Statement::View(view) => {
                writeln!(w, "{}View {}", indent(level), view.name)?;
                parameters(w, &view.parameters, inner)?;
                labeled(w, "where", ExprRef::Bool(&view.filter), inner)?;
            }
            Statement::Funnel(funnel) => {
                writeln!(
                    w,
                    "{}Funnel {} {}",
                    indent(level),
                    funnel.name,
                    funnel.funnel_type.keyword()
                )?;
                parameters(w, &funnel.parameters, inner)?;
                for step in funnel.steps.values() {
                    writeln!(w, "{}Step {}", indent(inner), step.id)?;
                    labeled(w, "when", ExprRef::Bool(&step.when), inner + 1)?;
                    if let Some(trigger) = &step.trigger {
                        let parts = [
                            ("timing", &trigger.timing),
                            ("within", &trigger.within),
                            ("after", &trigger.after),
                        ];
                        for (label, value) in parts {
                            if let Some(value) = value {
                                labeled(w, label, ExprRef::Value(value), inner + 1)?;
                            }
                        }
                    }
                }
                writeln!(w, "{}match: {}", indent(inner), funnel.pattern.generate_motif(0))?;
                funnel.pattern.write_explain(w, inner + 1)?;
                if let Some(within) = &funnel.within {
                    labeled(w, "within", ExprRef::Value(within), inner)?;
                }
                if let Some(limit) = &funnel.limit {
                    labeled(w, "limit", ExprRef::Value(limit), inner)?;
                }
            }
            Statement::Segment(segment) => {
                writeln!(w, "{}Segment {}", indent(level), segment.name)?;
                parameters(w, &segment.parameters, inner)?;
                for definition in &segment.definitions {
                    let label = format!("define {}", definition.name);
                    labeled(w, &label, ExprRef::Bool(&definition.condition), inner)?;
                }
            }
        }
        Ok(())
    }
}

impl Explain for Program {
    fn write_explain(&self, w: &mut dyn Write, level: usize) -> fmt::Result {
        for statement in &self.statements {
            statement.write_explain(w, level)?;
        }
        Ok(())
    }
}
