use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use motif_compiler::ast::Program;
use motif_compiler::render::from_json;
use motif_compiler::{CompileConfig, Session};
use motif_core::schema::RelationDef;
use motif_core::{DynamicSchema, Schema};

use super::CommandError;

/// Relation name of the schema used when `--schema` is absent.
const FALLBACK_ROOT: &str = "root";

/// Where the session's schema and settings come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionArgs {
    pub schema: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub time_zone: Option<String>,
    pub max_depth: Option<u32>,
    pub no_fold: bool,
}

impl SessionArgs {
    /// Settings from `--config`, then the individual flags on top.
    pub fn config(&self) -> Result<CompileConfig, CommandError> {
        let mut config = match &self.config {
            Some(path) => CompileConfig::from_json(&read_text(path)?)?,
            None => CompileConfig::default(),
        };
        if let Some(zone) = &self.time_zone {
            config.default_time_zone = zone.clone();
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if self.no_fold {
            config.fold_constants = false;
        }
        Ok(config)
    }

    pub fn schema(&self) -> Result<Arc<dyn Schema>, CommandError> {
        let schema = match &self.schema {
            Some(path) => DynamicSchema::from_json(&read_text(path)?)?,
            None => DynamicSchema::new(&RelationDef {
                name: FALLBACK_ROOT.to_string(),
                fields: Vec::new(),
                relations: Vec::new(),
            })?,
        };
        Ok(Arc::new(schema))
    }

    pub fn session(&self) -> Result<Session, CommandError> {
        let config = self.config()?;
        tracing::debug!(
            time_zone = %config.default_time_zone,
            max_depth = config.max_depth,
            fold = config.fold_constants,
            "session settings"
        );
        Ok(Session::new(self.schema()?).with_config(config))
    }
}

/// Program JSON from a file, or stdin for "-".
pub fn load_program(path: &Path) -> Result<Program, CommandError> {
    let text = read_text(path)?;
    Ok(from_json(&text)?)
}

fn read_text(path: &Path) -> Result<String, CommandError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CommandError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = SessionArgs {
            time_zone: Some("Europe/Berlin".to_string()),
            max_depth: Some(8),
            no_fold: true,
            ..SessionArgs::default()
        };
        let config = args.config().unwrap();
        assert_eq!(config.default_time_zone, "Europe/Berlin");
        assert_eq!(config.max_depth, 8);
        assert!(!config.fold_constants);
    }

    #[test]
    fn fallback_schema_has_bare_root() {
        let schema = SessionArgs::default().schema().unwrap();
        assert_eq!(schema.root().dotted(), "root");
        assert!(schema.resolve("userId").is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let args = SessionArgs {
            schema: Some(PathBuf::from("/nonexistent/schema.json")),
            ..SessionArgs::default()
        };
        let err = args.schema().unwrap_err();
        assert!(
            err.to_string()
                .starts_with("failed to read '/nonexistent/schema.json'"),
            "{err}"
        );
    }
}
