//! Typed views over syntax tree nodes.
//!
//! A view is a `(tree, id)` pair checked against the node kind, with
//! accessors for the parts of that kind of node.

use kiln_tokenizer::{DateTimeKind, Span, TokenKind, TokenValue, TomlDateTime};

use crate::printer;
use crate::syntax_kind::SyntaxKind;
use crate::tree::{NodeId, NodePayload, SyntaxTree};

/// Trait for typed views over tree nodes.
pub trait AstNode<'t>: Sized {
    /// Try to view `id` as this node type.
    fn cast(tree: &'t SyntaxTree, id: NodeId) -> Option<Self>;

    /// The tree the node lives in.
    fn tree(&self) -> &'t SyntaxTree;

    /// The node's id.
    fn id(&self) -> NodeId;

    /// The source text of this node, trivia included.
    fn text(&self) -> String {
        printer::to_text(self.tree(), self.id())
    }

    /// The source range of this node's tokens.
    fn span(&self) -> Option<Span> {
        self.tree().span(self.id())
    }
}

/// Macro for defining typed node views.
macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:pat) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name<'t> {
            tree: &'t SyntaxTree,
            id: NodeId,
        }

        impl<'t> AstNode<'t> for $name<'t> {
            fn cast(tree: &'t SyntaxTree, id: NodeId) -> Option<Self> {
                if matches!(tree.kind(id), $kind) {
                    Some(Self { tree, id })
                } else {
                    None
                }
            }

            fn tree(&self) -> &'t SyntaxTree {
                self.tree
            }

            fn id(&self) -> NodeId {
                self.id
            }
        }

        impl std::fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.id).finish()
            }
        }
    };
}

ast_node!(
    /// The root document node.
    DocumentNode,
    SyntaxKind::DOCUMENT
);

ast_node!(
    /// A `[table]` or `[[table array]]` section.
    TableNode,
    SyntaxKind::TABLE | SyntaxKind::TABLE_ARRAY
);

ast_node!(
    /// A `key = value` line or inline-table entry.
    KeyValueNode,
    SyntaxKind::KEY_VALUE
);

ast_node!(
    /// A possibly dotted key.
    KeyNode,
    SyntaxKind::KEY
);

ast_node!(
    /// Any value.
    ValueNode,
    SyntaxKind::STRING
        | SyntaxKind::INTEGER
        | SyntaxKind::FLOAT
        | SyntaxKind::BOOLEAN
        | SyntaxKind::DATETIME
        | SyntaxKind::ARRAY
        | SyntaxKind::INLINE_TABLE
);

ast_node!(
    /// An array value.
    ArrayNode,
    SyntaxKind::ARRAY
);

ast_node!(
    /// An inline table value.
    InlineTableNode,
    SyntaxKind::INLINE_TABLE
);

/// Views over every id in `ids` that has the right kind.
fn cast_all<'t, N: AstNode<'t>>(
    tree: &'t SyntaxTree,
    ids: &'t [NodeId],
) -> impl Iterator<Item = N> + 't {
    ids.iter().filter_map(move |&id| N::cast(tree, id))
}

// === Document ===

impl<'t> DocumentNode<'t> {
    /// Key-values before the first table header.
    pub fn key_values(self) -> impl Iterator<Item = KeyValueNode<'t>> + 't {
        let ids: &'t [NodeId] = match self.tree.payload(self.id) {
            NodePayload::Document { key_values, .. } => key_values,
            _ => &[],
        };
        cast_all(self.tree, ids)
    }

    /// Tables and table arrays, in document order.
    pub fn tables(self) -> impl Iterator<Item = TableNode<'t>> + 't {
        let ids: &'t [NodeId] = match self.tree.payload(self.id) {
            NodePayload::Document { tables, .. } => tables,
            _ => &[],
        };
        cast_all(self.tree, ids)
    }
}

// === Table ===

impl<'t> TableNode<'t> {
    /// Whether this is a `[[table array]]` element.
    pub fn is_array(&self) -> bool {
        self.tree.kind(self.id) == SyntaxKind::TABLE_ARRAY
    }

    /// The header key.
    pub fn key(&self) -> Option<KeyNode<'t>> {
        match self.tree.payload(self.id) {
            NodePayload::Table { key, .. } => key.and_then(|id| KeyNode::cast(self.tree, id)),
            _ => None,
        }
    }

    /// Key-values in the table body.
    pub fn key_values(self) -> impl Iterator<Item = KeyValueNode<'t>> + 't {
        let ids: &'t [NodeId] = match self.tree.payload(self.id) {
            NodePayload::Table { key_values, .. } => key_values,
            _ => &[],
        };
        cast_all(self.tree, ids)
    }
}

// === KeyValue ===

impl<'t> KeyValueNode<'t> {
    pub fn key(&self) -> Option<KeyNode<'t>> {
        match self.tree.payload(self.id) {
            NodePayload::KeyValue { key, .. } => KeyNode::cast(self.tree, *key),
            _ => None,
        }
    }

    /// The value, missing when the line is malformed.
    pub fn value(&self) -> Option<ValueNode<'t>> {
        match self.tree.payload(self.id) {
            NodePayload::KeyValue { value, .. } => {
                value.and_then(|id| ValueNode::cast(self.tree, id))
            }
            _ => None,
        }
    }
}

// === Key ===

impl<'t> KeyNode<'t> {
    /// Ids of the segment nodes (`BARE_KEY` or `STRING`), in order.
    pub fn segment_nodes(&self) -> Vec<NodeId> {
        let NodePayload::Key { base, dotted } = self.tree.payload(self.id) else {
            return Vec::new();
        };
        let mut out = vec![*base];
        for &item in dotted {
            if let NodePayload::DottedKeyItem {
                segment: Some(segment),
                ..
            } = self.tree.payload(item)
            {
                out.push(*segment);
            }
        }
        out
    }

    /// Decoded segment names: `a."b c".'d'` gives `["a", "b c", "d"]`.
    pub fn segments(&self) -> Vec<String> {
        self.segment_nodes()
            .into_iter()
            .filter_map(|id| segment_name(self.tree, id))
            .collect()
    }

    /// Whether the key has more than one segment.
    pub fn is_dotted(&self) -> bool {
        matches!(
            self.tree.payload(self.id),
            NodePayload::Key { dotted, .. } if !dotted.is_empty()
        )
    }
}

fn segment_name(tree: &SyntaxTree, id: NodeId) -> Option<String> {
    match tree.payload(id) {
        NodePayload::BareKey { token } => tree.token_text(*token).map(str::to_string),
        NodePayload::Scalar {
            value: TokenValue::String(s),
            ..
        } => Some(s.clone()),
        _ => None,
    }
}

// === Value ===

/// The type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    DateTime(DateTimeKind),
    Array,
    InlineTable,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::DateTime(DateTimeKind::OffsetDateTimeByZ)
            | ValueKind::DateTime(DateTimeKind::OffsetDateTimeByNumber) => {
                write!(f, "offset date-time")
            }
            ValueKind::DateTime(DateTimeKind::LocalDateTime) => write!(f, "local date-time"),
            ValueKind::DateTime(DateTimeKind::LocalDate) => write!(f, "local date"),
            ValueKind::DateTime(DateTimeKind::LocalTime) => write!(f, "local time"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::InlineTable => write!(f, "inline table"),
        }
    }
}

impl<'t> ValueNode<'t> {
    /// The type of this value.
    pub fn kind(&self) -> ValueKind {
        match self.tree.kind(self.id) {
            SyntaxKind::STRING => ValueKind::String,
            SyntaxKind::INTEGER => ValueKind::Integer,
            SyntaxKind::FLOAT => ValueKind::Float,
            SyntaxKind::BOOLEAN => ValueKind::Boolean,
            SyntaxKind::ARRAY => ValueKind::Array,
            SyntaxKind::INLINE_TABLE => ValueKind::InlineTable,
            _ => match self.scalar() {
                Some(TokenValue::DateTime(dt)) => ValueKind::DateTime(dt.kind),
                _ => ValueKind::DateTime(DateTimeKind::LocalDateTime),
            },
        }
    }

    /// The literal token of a scalar value.
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self.tree.payload(self.id) {
            NodePayload::Scalar { token, .. } => self.tree.token_kind(*token),
            _ => None,
        }
    }

    fn scalar(&self) -> Option<&'t TokenValue> {
        match self.tree.payload(self.id) {
            NodePayload::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.scalar()? {
            TokenValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.scalar()? {
            TokenValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.scalar()? {
            TokenValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// The decoded string (escapes processed).
    pub fn as_str(&self) -> Option<&'t str> {
        match self.scalar()? {
            TokenValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&'t TomlDateTime> {
        match self.scalar()? {
            TokenValue::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<ArrayNode<'t>> {
        ArrayNode::cast(self.tree, self.id)
    }

    pub fn as_inline_table(&self) -> Option<InlineTableNode<'t>> {
        InlineTableNode::cast(self.tree, self.id)
    }
}

// === Array ===

impl<'t> ArrayNode<'t> {
    /// Values in the array; items with a missing value are skipped.
    pub fn items(self) -> impl Iterator<Item = ValueNode<'t>> + 't {
        let tree = self.tree;
        let ids: &'t [NodeId] = match tree.payload(self.id) {
            NodePayload::Array { items, .. } => items,
            _ => &[],
        };
        ids.iter().filter_map(move |&item| match tree.payload(item) {
            NodePayload::ArrayItem {
                value: Some(value), ..
            } => ValueNode::cast(tree, *value),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }
}

// === InlineTable ===

impl<'t> InlineTableNode<'t> {
    /// Entries of the inline table.
    pub fn key_values(self) -> impl Iterator<Item = KeyValueNode<'t>> + 't {
        let tree = self.tree;
        let ids: &'t [NodeId] = match tree.payload(self.id) {
            NodePayload::InlineTable { items, .. } => items,
            _ => &[],
        };
        ids.iter().filter_map(move |&item| match tree.payload(item) {
            NodePayload::InlineTableItem { key_value, .. } => KeyValueNode::cast(tree, *key_value),
            _ => None,
        })
    }
}
