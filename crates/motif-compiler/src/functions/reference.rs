use motif_core::DataType;

use super::{Arity, CallState, FunctionDef, call_state, unbound};
use crate::analyze::AnalysisCx;
use crate::analyze::symbols::Definition;
use crate::analyze::utils::did_you_mean;
use crate::ast::{FunctionCall, ValueExpr};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

/// Statement introspection offered as functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    FunnelCompleted,
    FunnelStepReached,
    SegmentOf,
    InView,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::FunnelCompleted,
        ReferenceKind::FunnelStepReached,
        ReferenceKind::SegmentOf,
        ReferenceKind::InView,
    ];

    fn function_name(self) -> &'static str {
        match self {
            ReferenceKind::FunnelCompleted => "funnel_completed",
            ReferenceKind::FunnelStepReached => "funnel_step_reached",
            ReferenceKind::SegmentOf => "segment_of",
            ReferenceKind::InView => "in_view",
        }
    }

    fn referent(self) -> &'static str {
        match self {
            ReferenceKind::FunnelCompleted | ReferenceKind::FunnelStepReached => "funnel",
            ReferenceKind::SegmentOf => "segment",
            ReferenceKind::InView => "view",
        }
    }

    fn matches(self, definition: &Definition) -> bool {
        match self {
            ReferenceKind::FunnelCompleted | ReferenceKind::FunnelStepReached => {
                matches!(definition, Definition::Funnel { .. })
            }
            ReferenceKind::SegmentOf => matches!(definition, Definition::Segment { .. }),
            ReferenceKind::InView => matches!(definition, Definition::View),
        }
    }

    fn dtype(self) -> DataType {
        match self {
            ReferenceKind::FunnelCompleted | ReferenceKind::InView => DataType::Boolean,
            ReferenceKind::FunnelStepReached => DataType::Long,
            ReferenceKind::SegmentOf => DataType::String,
        }
    }
}

/// `funnel_completed('f')`, `funnel_step_reached('f')`, `segment_of('s')`,
/// `in_view('v')`. The single argument is a string literal naming another
/// statement of the program. The result is known per root entity.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFn {
    kind: ReferenceKind,
}

impl ReferenceFn {
    pub fn new(kind: ReferenceKind) -> Self {
        Self { kind }
    }
}

impl FunctionDef for ReferenceFn {
    fn name(&self) -> &'static str {
        self.kind.function_name()
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    #[tracing::instrument(skip_all, fields(function = self.name()))]
    fn bind(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<CallState> {
        let arg = &call.args[0];
        let span = arg.span();
        let Some(name) = arg.as_constant().and_then(|c| c.as_str()) else {
            return Err(Diagnostic::new(DiagnosticKind::TypeError, span).message(format!(
                "`{}` expects the {} name as a string literal",
                call.name,
                self.kind.referent()
            )));
        };

        if cx.current_statement() == Some(name) {
            return Err(Diagnostic::new(DiagnosticKind::TypeError, span)
                .message(format!("`{name}` cannot refer to itself")));
        }

        match cx.symbols().get_definition(name) {
            Some(definition) if self.kind.matches(definition) => {}
            Some(definition) => {
                return Err(Diagnostic::new(DiagnosticKind::TypeError, span).message(format!(
                    "`{name}` is a {}, not a {}",
                    definition.describe(),
                    self.kind.referent()
                )));
            }
            None => {
                let candidates = cx
                    .symbols()
                    .names_where(|definition| self.kind.matches(definition));
                let mut diagnostic =
                    Diagnostic::new(DiagnosticKind::UnresolvedReference, span).message(name);
                if let Some(hint) = did_you_mean(name, candidates) {
                    diagnostic = diagnostic.hint(hint);
                }
                return Err(diagnostic);
            }
        }

        if let Some(from) = cx.current_statement().map(str::to_string) {
            cx.symbols_mut().add_reference(from, name, span);
        }
        tracing::trace!(referent = name, "bound statement reference");
        Ok(CallState::Referent {
            name: name.to_string(),
            root: cx.schema().root(),
        })
    }

    fn validate(&self, _cx: &mut AnalysisCx<'_>, _call: &mut FunctionCall) -> DiagResult<()> {
        Ok(())
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        match call_state(call) {
            Some(CallState::Referent { .. }) => Ok(self.kind.dtype()),
            _ => Err(unbound(call)),
        }
    }

    fn lowest_evaluation_point(
        &self,
        call: &FunctionCall,
    ) -> DiagResult<Option<motif_core::Path>> {
        match call_state(call) {
            Some(CallState::Referent { root, .. }) => Ok(Some(root.clone())),
            _ => Err(unbound(call)),
        }
    }

    fn optimize(
        &self,
        _cx: &mut AnalysisCx<'_>,
        call: FunctionCall,
    ) -> DiagResult<ValueExpr> {
        Ok(ValueExpr::FunctionCall(call))
    }
}
