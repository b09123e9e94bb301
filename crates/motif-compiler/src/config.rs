//! Compilation settings and the shared read-only context built from them.

use std::sync::Arc;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};

const DEFAULT_TIME_ZONE: &str = "UTC";
const DEFAULT_MAX_DEPTH: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// IANA zone used by date-time bucketing without an explicit zone.
    pub default_time_zone: String,
    /// Deepest expression nesting accepted before bind.
    pub max_depth: u32,
    /// Replace foldable subtrees with constants during optimize.
    pub fold_constants: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            default_time_zone: DEFAULT_TIME_ZONE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            fold_constants: true,
        }
    }
}

impl CompileConfig {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Immutable facts every node may consult, shared across passes.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalContext {
    time_zone: Tz,
    fold_constants: bool,
}

impl GlobalContext {
    pub fn new(config: &CompileConfig) -> DiagResult<Arc<Self>> {
        let time_zone = parse_time_zone(&config.default_time_zone, Span::default())?;
        Ok(Arc::new(Self {
            time_zone,
            fold_constants: config.fold_constants,
        }))
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn time_zone_name(&self) -> &'static str {
        self.time_zone.name()
    }

    pub fn fold_constants(&self) -> bool {
        self.fold_constants
    }
}

/// Parse an IANA zone identifier such as `Europe/Berlin`.
pub fn parse_time_zone(name: &str, span: Span) -> DiagResult<Tz> {
    name.parse::<Tz>().map_err(|_| {
        Diagnostic::new(DiagnosticKind::TypeError, span)
            .message(format!("`{name}` is not a known time zone"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CompileConfig::default();
        assert_eq!(config.default_time_zone, "UTC");
        assert_eq!(config.max_depth, 512);
        assert!(config.fold_constants);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CompileConfig::from_json(r#"{"max_depth": 16}"#).unwrap();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.default_time_zone, "UTC");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(CompileConfig::from_json(r#"{"max_dept": 16}"#).is_err());
    }

    #[test]
    fn global_context_parses_zone() {
        let config = CompileConfig {
            default_time_zone: "Europe/Berlin".into(),
            ..Default::default()
        };
        let global = GlobalContext::new(&config).unwrap();
        assert_eq!(global.time_zone_name(), "Europe/Berlin");
    }

    #[test]
    fn global_context_rejects_bad_zone() {
        let config = CompileConfig {
            default_time_zone: "Mars/Olympus".into(),
            ..Default::default()
        };
        let err = GlobalContext::new(&config).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::TypeError);
        assert_eq!(
            err.message,
            "type error: `Mars/Olympus` is not a known time zone"
        );
    }
}
