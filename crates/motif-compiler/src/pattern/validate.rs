use crate::ast::{ListOp, MatchDef, MatchList};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};

fn structure_error(span: Span, message: impl AsRef<str>) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::PatternStructureError, span).message(message)
}

/// Resolve step ids against `known` and settle capture flags bottom-up.
///
/// On success every node's `capturing` reflects its descendants and the top
/// level is capturing.
#[tracing::instrument(skip_all, fields(known = known.len()))]
pub fn validate_pattern(pattern: &mut MatchDef, known: &[i64]) -> DiagResult<()> {
    settle(pattern, known)?;
    if !pattern.capturing() {
        return Err(
            structure_error(pattern.span(), "the top level of a match must capture")
                .hint("drop the outer `(?: ...)`"),
        );
    }
    Ok(())
}

fn check_known(id: i64, known: &[i64], span: Span) -> DiagResult<()> {
    if known.contains(&id) {
        return Ok(());
    }
    let listed = known
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(structure_error(span, format!("step {id} is not defined"))
        .hint(format!("defined steps: {listed}")))
}

fn settle(node: &mut MatchDef, known: &[i64]) -> DiagResult<()> {
    match node {
        MatchDef::Step(step) => check_known(step.id, known, step.span),
        MatchDef::BracketSet(set) => {
            if set.steps.is_empty() {
                return Err(structure_error(set.span, "bracket set lists no steps"));
            }
            for id in &set.steps {
                check_known(*id, known, set.span)?;
            }
            Ok(())
        }
        MatchDef::Repeat(repeat) => {
            if repeat.min < 0 {
                return Err(structure_error(
                    repeat.span,
                    format!("repeat minimum {} is negative", repeat.min),
                ));
            }
            if let Some(max) = repeat.max
                && max < repeat.min
            {
                return Err(structure_error(
                    repeat.span,
                    format!("repeat maximum {max} is below minimum {}", repeat.min),
                ));
            }
            settle(&mut repeat.child, known)?;
            let child = repeat.child.capturing();
            if !repeat.capturing && child {
                return Err(structure_error(
                    repeat.span,
                    "non-capturing repeat around a capturing pattern",
                ));
            }
            repeat.capturing = child;
            Ok(())
        }
        MatchDef::List(list) => settle_list(list, known),
    }
}

fn settle_list(list: &mut MatchList, known: &[i64]) -> DiagResult<()> {
    if list.items.is_empty() {
        return Err(structure_error(list.span, "empty pattern list"));
    }
    for item in &mut list.items {
        settle(item, known)?;
    }

    let capturing_children = list.items.iter().filter(|i| i.capturing()).count();
    let any_capturing = capturing_children > 0;
    if !list.capturing && any_capturing {
        return Err(structure_error(
            list.span,
            "non-capturing group contains a capturing pattern",
        ));
    }
    if list.op == ListOp::Or && any_capturing && capturing_children < list.items.len() {
        return Err(
            structure_error(list.span, "alternatives mix capturing and non-capturing patterns")
                .hint("mark every alternative `(?: ...)` or none"),
        );
    }
    list.capturing = any_capturing;

    if list.capturing {
        let edges = [list.items.first(), list.items.last()];
        if let Some(edge) = edges.into_iter().flatten().find(|i| !i.capturing()) {
            return Err(structure_error(
                edge.span(),
                "a capturing sequence cannot start or end with a non-capturing pattern",
            ));
        }
    }
    Ok(())
}
