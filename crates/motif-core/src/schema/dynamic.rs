use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::{FieldInfo, Path, Schema};
use crate::{DataType, SchemaError};

/// Relation node of the JSON schema description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: DataType,
    #[serde(default)]
    pub vector: bool,
    #[serde(default)]
    pub ordinal: bool,
}

/// Schema built at runtime from a [`RelationDef`] tree.
#[derive(Debug, Clone)]
pub struct DynamicSchema {
    root: Path,
    /// Absolute dotted name to path, relations and fields alike.
    paths: IndexMap<String, Path>,
    /// Simple relation name to every relation carrying it.
    relations_by_name: IndexMap<String, Vec<Path>>,
    /// Relation dotted name to its ordinal field.
    ordinals: IndexMap<String, Path>,
}

impl DynamicSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let root: RelationDef = serde_json::from_str(json)?;
        Self::new(&root)
    }

    pub fn new(root: &RelationDef) -> Result<Self, SchemaError> {
        let mut schema = Self {
            root: Path::relation([root.name.clone()]),
            paths: IndexMap::new(),
            relations_by_name: IndexMap::new(),
            ordinals: IndexMap::new(),
        };
        schema.register(&[], root)?;
        Ok(schema)
    }

    fn register(&mut self, prefix: &[String], def: &RelationDef) -> Result<(), SchemaError> {
        check_name(&def.name)?;
        let mut segments = prefix.to_vec();
        segments.push(def.name.clone());
        let relation = Path::relation(segments.iter().cloned());
        let dotted = relation.dotted();

        self.paths.insert(dotted.clone(), relation.clone());
        self.relations_by_name
            .entry(def.name.clone())
            .or_default()
            .push(relation);

        let mut members = IndexSet::new();
        let names = def
            .fields
            .iter()
            .map(|f| &f.name)
            .chain(def.relations.iter().map(|r| &r.name));
        for name in names {
            if !members.insert(name.as_str()) {
                return Err(SchemaError::InvalidSchema(format!(
                    "`{dotted}` declares `{name}` more than once"
                )));
            }
        }

        for field in &def.fields {
            check_name(&field.name)?;
            let info = FieldInfo {
                dtype: field.dtype,
                vector: field.vector,
                ordinal: field.ordinal,
            };
            let path = Path::field(segments.iter().cloned().chain([field.name.clone()]), info);

            if field.ordinal {
                if field.vector || !matches!(field.dtype, DataType::Long | DataType::Datetime) {
                    return Err(SchemaError::InvalidSchema(format!(
                        "ordinal field `{path}` must be a scalar LONG or DATETIME"
                    )));
                }
                if let Some(existing) = self.ordinals.insert(dotted.clone(), path.clone()) {
                    return Err(SchemaError::InvalidSchema(format!(
                        "`{dotted}` has two ordinal fields: `{existing}` and `{path}`"
                    )));
                }
            }
            self.paths.insert(path.dotted(), path);
        }

        for child in &def.relations {
            self.register(&segments, child)?;
        }
        Ok(())
    }

    fn lookup(&self, dotted: &str) -> Option<Path> {
        self.paths.get(dotted).cloned()
    }
}

fn check_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.contains('.') {
        return Err(SchemaError::InvalidSchema(format!(
            "invalid member name `{name}`"
        )));
    }
    Ok(())
}

impl Schema for DynamicSchema {
    fn root(&self) -> Path {
        self.root.clone()
    }

    fn resolve(&self, name: &str) -> Result<Path, SchemaError> {
        let name = name.trim();
        if let Some(path) = self.lookup(name) {
            return Ok(path);
        }

        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        let mut matches: Vec<Path> = self
            .relations_by_name
            .get(head)
            .into_iter()
            .flatten()
            .filter_map(|relation| match rest {
                Some(rest) => self.lookup(&format!("{relation}.{rest}")),
                None => Some(relation.clone()),
            })
            .collect();

        if matches.is_empty()
            && let Some(path) = self.lookup(&format!("{}.{name}", self.root))
        {
            matches.push(path);
        }

        match matches.len() {
            0 => Err(SchemaError::UnknownPath(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(SchemaError::AmbiguousPath {
                name: name.to_string(),
                candidates: matches.iter().map(Path::dotted).collect(),
            }),
        }
    }

    fn ordinal_field(&self, structure: &Path) -> Option<Path> {
        self.ordinals.get(&structure.structure().dotted()).cloned()
    }

    fn known_paths(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }
}
