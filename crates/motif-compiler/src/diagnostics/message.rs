/// Diagnostic kinds ordered by priority (highest priority first).
///
/// The order follows the pipeline: reader defects come before anything the
/// passes report, name resolution before typing, typing before axis and
/// pattern structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Canonical reader
    SyntaxDefect,
    LimitExceeded,

    // Name resolution
    DuplicateDefinition,
    UnresolvedReference,
    ArityError,

    // Typing and folding
    TypeError,
    ConstantRequiredError,
    ArithmeticFault,

    // Structure
    ScopeAxisError,
    PatternStructureError,
}

impl DiagnosticKind {
    /// Base message for this kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::SyntaxDefect => "syntax error",
            Self::LimitExceeded => "nesting limit exceeded",
            Self::DuplicateDefinition => "duplicate definition",
            Self::UnresolvedReference => "unresolved reference",
            Self::ArityError => "wrong number of arguments",
            Self::TypeError => "type error",
            Self::ConstantRequiredError => "constant expression required",
            Self::ArithmeticFault => "arithmetic fault",
            Self::ScopeAxisError => "expression mixes unrelated relations",
            Self::PatternStructureError => "invalid match pattern",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateDefinition => "`{}` is already defined".to_string(),
            Self::UnresolvedReference => "`{}` is not defined".to_string(),
            Self::ArityError => "{}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }

    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ScopeAxisError => {
                Some("both sides must be evaluated on one chain of nested relations")
            }
            Self::ConstantRequiredError => {
                Some("use literals, parameters with defaults are not folded")
            }
            _ => None,
        }
    }
}
