use std::fmt;
use std::sync::Arc;

use crate::DataType;
use crate::invariants::ensure_field_has_relation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    pub dtype: DataType,
    /// Field holds a list of values.
    pub vector: bool,
    /// Field orders the rows of its relation in time.
    pub ordinal: bool,
}

impl FieldInfo {
    pub fn scalar(dtype: DataType) -> Self {
        Self {
            dtype,
            vector: false,
            ordinal: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTarget {
    Relation,
    Field(FieldInfo),
}

/// A resolved location in the schema.
///
/// Relation paths double as evaluation points: an expression is evaluated
/// once per row of the relation its lowest path lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Arc<[String]>,
    target: PathTarget,
}

impl Path {
    pub fn relation<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            target: PathTarget::Relation,
        }
    }

    pub fn field<S: Into<String>>(segments: impl IntoIterator<Item = S>, info: FieldInfo) -> Self {
        let segments: Arc<[String]> = segments.into_iter().map(Into::into).collect();
        ensure_field_has_relation(&segments);
        Self {
            segments,
            target: PathTarget::Field(info),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    pub fn target(&self) -> PathTarget {
        self.target
    }

    pub fn is_relation(&self) -> bool {
        self.target == PathTarget::Relation
    }

    pub fn is_field(&self) -> bool {
        !self.is_relation()
    }

    pub fn is_root(&self) -> bool {
        self.is_relation() && self.segments.len() == 1
    }

    pub fn field_info(&self) -> Option<FieldInfo> {
        match self.target {
            PathTarget::Field(info) => Some(info),
            PathTarget::Relation => None,
        }
    }

    /// Value type of a field path. Relations have none.
    pub fn dtype(&self) -> Option<DataType> {
        self.field_info().map(|info| info.dtype)
    }

    pub fn is_vector(&self) -> bool {
        self.field_info().is_some_and(|info| info.vector)
    }

    pub(crate) fn structure_or_none(&self) -> Option<Path> {
        match self.target {
            PathTarget::Relation => Some(self.clone()),
            PathTarget::Field(_) => {
                let parent = &self.segments[..self.segments.len() - 1];
                (!parent.is_empty()).then(|| Path::relation(parent.iter().cloned()))
            }
        }
    }

    /// The relation this path lives in: itself for relations, the containing
    /// relation for fields.
    pub fn structure(&self) -> Path {
        self.ensure_structure()
    }

    /// Where aggregate facts about this path (its size) are known: the parent
    /// relation for relations, the containing relation for fields.
    pub fn parent_structure(&self) -> Option<Path> {
        match self.target {
            PathTarget::Field(_) => Some(self.structure()),
            PathTarget::Relation if self.segments.len() > 1 => Some(Path::relation(
                self.segments[..self.segments.len() - 1].iter().cloned(),
            )),
            PathTarget::Relation => None,
        }
    }

    /// Inclusive ancestry between the structures of both paths.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        let (mine, theirs) = (self.structure(), other.structure());
        theirs.segments.starts_with(&mine.segments)
    }

    /// Structures of `a` and `b` lie on different branches.
    pub fn not_on_path(a: &Path, b: &Path) -> bool {
        !a.is_ancestor_of(b) && !b.is_ancestor_of(a)
    }

    /// The deeper of two structures on one chain, `None` when they diverge.
    pub fn lowest(a: &Path, b: &Path) -> Option<Path> {
        if a.is_ancestor_of(b) {
            Some(b.structure())
        } else if b.is_ancestor_of(a) {
            Some(a.structure())
        } else {
            None
        }
    }

    /// The shallower of two structures on one chain, `None` when they diverge.
    pub fn higher(a: &Path, b: &Path) -> Option<Path> {
        if a.is_ancestor_of(b) {
            Some(a.structure())
        } else if b.is_ancestor_of(a) {
            Some(b.structure())
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.structure().segments.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
