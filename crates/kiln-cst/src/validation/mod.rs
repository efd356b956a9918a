//! Semantic validation of a parsed document.
//!
//! One depth-first walk registers every table, table array and key in a
//! [`PathTable`] and reports keys and tables that are defined twice, or
//! defined in a way that contradicts an earlier definition.

mod path;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use kiln_tokenizer::{DateTimeKind, Diagnostic, DiagnosticBag, SourceView};
use tracing::{debug, trace};

use crate::ast::{AstNode, DocumentNode, KeyNode, KeyValueNode, TableNode, ValueKind, ValueNode};
use crate::tree::{NodeId, SyntaxTree};

pub use path::{ObjectPath, PathSegment};

/// Validation policies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Reject arrays whose elements have different types.
    pub homogeneous_arrays: bool,
}

impl ValidateOptions {
    pub fn homogeneous_arrays(mut self, enabled: bool) -> Self {
        self.homogeneous_arrays = enabled;
        self
    }
}

/// What a path was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Table,
    TableArray,
    Value(ValueKind),
}

/// What the path table knows about one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// The key that declared the path (or, for an implicit table, the key
    /// that first went through it).
    pub node: NodeId,
    pub kind: ObjectKind,
    /// Created as a side effect of a longer key, not declared itself.
    pub is_implicit: bool,
    /// Created by a dotted key in a key-value rather than by a header.
    pub from_dotted_keys: bool,
    /// Number of elements opened so far, for table arrays.
    pub array_index: usize,
}

/// Every path declared in a document.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    entries: HashMap<ObjectPath, PathEntry>,
}

impl PathTable {
    pub fn get(&self, path: &ObjectPath) -> Option<&PathEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &ObjectPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectPath, &PathEntry)> {
        self.entries.iter()
    }

    /// Every path rendered as dotted text, sorted.
    pub fn dotted_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.keys().map(ToString::to_string).collect();
        paths.sort();
        paths
    }

    /// Record a declaration at `path`.
    ///
    /// On success, returns the array index to append to the path when the
    /// walk continues inside a table array element.
    fn register(
        &mut self,
        path: &ObjectPath,
        node: NodeId,
        kind: ObjectKind,
        is_implicit: bool,
        from_dotted_keys: bool,
    ) -> Result<Option<usize>, PathError> {
        let existing = match self.entries.entry(path.clone()) {
            Entry::Vacant(vacant) => {
                trace!(%path, ?kind, is_implicit, from_dotted_keys, "register");
                let array_index = usize::from(kind == ObjectKind::TableArray);
                vacant.insert(PathEntry {
                    node,
                    kind,
                    is_implicit,
                    from_dotted_keys,
                    array_index,
                });
                return Ok((kind == ObjectKind::TableArray).then_some(0));
            }
            Entry::Occupied(occupied) => occupied.into_mut(),
        };

        trace!(%path, ?kind, existing = ?existing.kind, "register again");
        let original = existing.node;
        match (existing.kind, kind) {
            // `[[a]]` again opens the next element.
            (ObjectKind::TableArray, ObjectKind::TableArray) => {
                existing.array_index += 1;
                Ok(Some(existing.array_index - 1))
            }
            // `[a.b]` or `a.b = ..` after `[[a]]` goes into the last element.
            (ObjectKind::TableArray, ObjectKind::Table) if is_implicit => {
                Ok(Some(existing.array_index - 1))
            }
            (ObjectKind::Table, ObjectKind::Table) if !is_implicit => {
                if existing.is_implicit && !existing.from_dotted_keys {
                    existing.is_implicit = false;
                    existing.node = node;
                    Ok(None)
                } else {
                    Err(PathError::Redefined { original })
                }
            }
            (ObjectKind::Table, ObjectKind::Table) => {
                if !from_dotted_keys || existing.from_dotted_keys {
                    Ok(None)
                } else {
                    Err(PathError::Redefined { original })
                }
            }
            (ObjectKind::Value(_), ObjectKind::Table) if is_implicit => {
                Err(PathError::NotATable { original })
            }
            _ => Err(PathError::Redefined { original }),
        }
    }
}

/// Why a declaration was rejected.
#[derive(Debug)]
enum PathError {
    /// The path is already declared with an incompatible kind or provenance.
    Redefined { original: NodeId },
    /// A longer key goes through a path that holds a value.
    NotATable { original: NodeId },
}

/// Validate a parsed tree.
///
/// Problems are appended to `diagnostics`; the returned table holds every
/// path declared before or despite them.
pub fn validate(
    tree: &SyntaxTree,
    view: &SourceView<'_>,
    options: &ValidateOptions,
    diagnostics: &mut DiagnosticBag,
) -> PathTable {
    let errors_before = diagnostics.len();
    let mut validator = Validator {
        tree,
        view,
        options,
        diagnostics,
        table: PathTable::default(),
        current: ObjectPath::new(),
    };
    validator.document();
    debug!(
        paths = validator.table.len(),
        errors = validator.diagnostics.len() - errors_before,
        "validated"
    );
    validator.table
}

struct Validator<'a, 'src> {
    tree: &'a SyntaxTree,
    view: &'a SourceView<'src>,
    options: &'a ValidateOptions,
    diagnostics: &'a mut DiagnosticBag,
    table: PathTable,
    current: ObjectPath,
}

impl<'a> Validator<'a, '_> {
    fn document(&mut self) {
        let Some(root) = DocumentNode::cast(self.tree, self.tree.root()) else {
            return;
        };
        for key_value in root.key_values() {
            self.key_value(key_value);
        }
        for table in root.tables() {
            self.current.clear();
            if self.table_header(table) {
                for key_value in table.key_values() {
                    self.key_value(key_value);
                }
            }
        }
    }

    /// Register a header and leave `current` at its body's path.
    ///
    /// Returns `false` when the body cannot be placed anywhere.
    fn table_header(&mut self, table: TableNode<'a>) -> bool {
        let Some(key) = table.key() else {
            return false;
        };
        let segments = key.segments();
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };
        for segment in parents {
            if !self.enter(segment, key, ObjectKind::Table, true, false) {
                return false;
            }
        }
        let kind = if table.is_array() {
            ObjectKind::TableArray
        } else {
            ObjectKind::Table
        };
        self.enter(last, key, kind, false, false)
    }

    fn key_value(&mut self, key_value: KeyValueNode<'a>) {
        let saved = self.current.len();
        self.key_value_inner(key_value);
        self.current.truncate(saved);
    }

    fn key_value_inner(&mut self, key_value: KeyValueNode<'a>) {
        let (Some(key), Some(value)) = (key_value.key(), key_value.value()) else {
            return;
        };
        let segments = key.segments();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        for segment in parents {
            if !self.enter(segment, key, ObjectKind::Table, true, true) {
                return;
            }
        }
        if self.enter(last, key, ObjectKind::Value(value.kind()), false, false) {
            self.value(value);
        }
    }

    /// Walk into arrays and inline tables. `current` is the value's path.
    fn value(&mut self, value: ValueNode<'a>) {
        if let Some(inline_table) = value.as_inline_table() {
            for key_value in inline_table.key_values() {
                self.key_value(key_value);
            }
        } else if let Some(array) = value.as_array() {
            if self.options.homogeneous_arrays {
                self.check_homogeneous(value);
            }
            for (index, item) in array.items().enumerate() {
                self.current.push(PathSegment::Index(index));
                let kind = ObjectKind::Value(item.kind());
                // Element paths are fresh: the array itself was just registered.
                if self
                    .table
                    .register(&self.current, item.id(), kind, false, false)
                    .is_ok()
                {
                    self.value(item);
                }
                self.current.pop();
            }
        }
    }

    fn check_homogeneous(&mut self, value: ValueNode<'a>) {
        let Some(array) = value.as_array() else {
            return;
        };
        let mut items = array.items();
        let Some(first) = items.next() else {
            return;
        };
        let expected = type_class(first.kind());
        if let Some(mixed) = items.find(|item| type_class(item.kind()) != expected) {
            let span = mixed.span().or_else(|| value.span()).unwrap_or_default();
            let message = format!(
                "mixed types in array: expected {}, found {}",
                first.kind(),
                mixed.kind()
            );
            self.diagnostics.error(self.view.source_span(span), message);
        }
    }

    /// Push `segment` and register the resulting path.
    fn enter(
        &mut self,
        segment: &str,
        key: KeyNode<'a>,
        kind: ObjectKind,
        is_implicit: bool,
        from_dotted_keys: bool,
    ) -> bool {
        self.current.push(PathSegment::Key(segment.to_string()));
        match self.table.register(
            &self.current,
            key.id(),
            kind,
            is_implicit,
            from_dotted_keys,
        ) {
            Ok(index) => {
                if let Some(index) = index {
                    self.current.push(PathSegment::Index(index));
                }
                true
            }
            Err(err) => {
                self.emit_path_error(err, key);
                false
            }
        }
    }

    fn emit_path_error(&mut self, err: PathError, key: KeyNode<'a>) {
        let span = key.span().unwrap_or_default();
        let (message, original) = match err {
            PathError::Redefined { original } => (
                format!("the key `{}` is already defined", self.current),
                original,
            ),
            PathError::NotATable { original } => (
                format!("the key `{}` is a value, not a table", self.current),
                original,
            ),
        };
        let mut diagnostic = Diagnostic::error(self.view.source_span(span), message);
        if let Some(original_span) = self.tree.span(original) {
            diagnostic =
                diagnostic.with_related(self.view.source_span(original_span), "first defined here");
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Value kinds that count as the same type in an array.
fn type_class(kind: ValueKind) -> ValueKind {
    match kind {
        ValueKind::DateTime(DateTimeKind::OffsetDateTimeByNumber) => {
            ValueKind::DateTime(DateTimeKind::OffsetDateTimeByZ)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn run(source: &str, options: ValidateOptions) -> (PathTable, Vec<String>) {
        let view = SourceView::new(source);
        let parse = parse_source(&view);
        assert!(parse.is_ok(), "parse errors: {}", parse.diagnostics());
        let mut diagnostics = DiagnosticBag::new();
        let table = validate(parse.tree(), &view, &options, &mut diagnostics);
        let messages = diagnostics.iter().map(|d| d.message.clone()).collect();
        (table, messages)
    }

    fn errors(source: &str) -> Vec<String> {
        run(source, ValidateOptions::default()).1
    }

    fn paths(source: &str) -> Vec<String> {
        let (table, messages) = run(source, ValidateOptions::default());
        assert!(messages.is_empty(), "unexpected errors: {messages:?}");
        table.dotted_paths()
    }

    #[test]
    fn test_duplicate_key() {
        assert_eq!(
            errors("a = 1\na = 2\n"),
            vec!["the key `a` is already defined"]
        );
    }

    #[test]
    fn test_table_array_elements_get_indices() {
        assert_eq!(
            paths("[[a]]\nb = 1\n[[a]]\nb = 2\n"),
            vec!["a", "a.0.b", "a.1.b"]
        );
    }

    #[test]
    fn test_implicit_then_explicit_table() {
        assert_eq!(
            paths("[a.b.c]\nanswer = 1\n[a]\nbetter = 2\n"),
            vec!["a", "a.b", "a.b.c", "a.b.c.answer", "a.better"]
        );
    }

    #[test]
    fn test_nested_table_array() {
        assert_eq!(
            paths("[[a]]\nb = 1\n[[a.c]]\nb = 2\n"),
            vec!["a", "a.0.b", "a.0.c", "a.0.c.0.b"]
        );
    }

    #[test]
    fn test_sub_table_of_table_array_element() {
        assert_eq!(
            paths("[[fruit]]\nname = 1\n[fruit.physical]\ncolor = 2\n[[fruit]]\n[fruit.physical]\n"),
            vec![
                "fruit",
                "fruit.0.name",
                "fruit.0.physical",
                "fruit.0.physical.color",
                "fruit.1.physical",
            ]
        );
    }

    #[test]
    fn test_key_redeclared_as_table_array() {
        assert!(!errors("[[a]]\nb = 1\n[[a.b]]\nc = 2\n[a.b]\nd = 3\n").is_empty());
    }

    #[test]
    fn test_table_defined_twice() {
        assert_eq!(
            errors("[a]\nx = 1\n[a]\ny = 2\n"),
            vec!["the key `a` is already defined"]
        );
    }

    #[test]
    fn test_dotted_keys_within_one_table() {
        assert_eq!(
            paths("[fruit]\napple.color = 1\napple.taste.sweet = true\n"),
            vec![
                "fruit",
                "fruit.apple",
                "fruit.apple.color",
                "fruit.apple.taste",
                "fruit.apple.taste.sweet",
            ]
        );
    }

    #[test]
    fn test_sub_table_of_dotted_key_table() {
        assert!(errors("[fruit]\napple.color = 1\n[fruit.apple.texture]\nsmooth = true\n").is_empty());
    }

    #[test]
    fn test_header_after_dotted_keys_is_a_redefinition() {
        assert_eq!(
            errors("[fruit]\napple.color = 1\n[fruit.apple]\n"),
            vec!["the key `fruit.apple` is already defined"]
        );
    }

    #[test]
    fn test_dotted_keys_cannot_extend_a_header_table() {
        assert_eq!(
            errors("[a.b.c]\nz = 9\n[a]\nb.c.t = 9\n"),
            vec!["the key `a.b` is already defined"]
        );
    }

    #[test]
    fn test_key_through_a_value() {
        assert_eq!(
            errors("a = 1\na.b = 2\n"),
            vec!["the key `a` is a value, not a table"]
        );
    }

    #[test]
    fn test_inline_tables_are_closed() {
        assert_eq!(
            errors("a = { b = 1 }\n[a]\nc = 2\n"),
            vec!["the key `a` is already defined"]
        );
        assert_eq!(
            errors("a = { b = 1 }\na.c = 2\n"),
            vec!["the key `a` is a value, not a table"]
        );
    }

    #[test]
    fn test_duplicate_inside_inline_table() {
        assert_eq!(
            errors("a = { b = 1, b = 2 }\n"),
            vec!["the key `a.b` is already defined"]
        );
    }

    #[test]
    fn test_static_array_cannot_be_extended() {
        assert_eq!(
            errors("a = [1]\n[[a]]\n"),
            vec!["the key `a` is already defined"]
        );
    }

    #[test]
    fn test_array_elements_are_addressable() {
        assert_eq!(
            paths("a = [{ x = 1 }, { x = 2 }]\n"),
            vec!["a", "a.0", "a.0.x", "a.1", "a.1.x"]
        );
    }

    #[test]
    fn test_every_conflict_is_reported() {
        assert_eq!(errors("a = 1\na = 2\nb = 1\nb = 2\n").len(), 2);
    }

    #[test]
    fn test_redefinition_points_at_original() {
        let source = "a = 1\na = 2\n";
        let view = SourceView::new(source);
        let parse = parse_source(&view);
        let mut diagnostics = DiagnosticBag::new();
        validate(parse.tree(), &view, &ValidateOptions::default(), &mut diagnostics);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.span.start.line, 1);
        let (related, label) = diagnostic.related.as_ref().unwrap();
        assert_eq!(related.start.line, 0);
        assert_eq!(label, "first defined here");
    }

    #[test]
    fn test_mixed_arrays_are_optional() {
        let source = "a = [1, \"two\"]\n";
        assert!(run(source, ValidateOptions::default()).1.is_empty());
        assert_eq!(
            run(source, ValidateOptions::default().homogeneous_arrays(true)).1,
            vec!["mixed types in array: expected integer, found string"]
        );
        assert!(
            run(
                "a = [[1], [\"x\"]]\nb = [1979-05-27T00:00:00Z, 1979-05-27T00:00:00+01:00]\n",
                ValidateOptions::default().homogeneous_arrays(true)
            )
            .1
            .is_empty()
        );
    }
}
