//! Arena storage for the syntax tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Children
//! are listed in the parent's [`NodePayload`]; the `parent` field is only a
//! back-reference used to reject attaching a node twice.

use std::fmt::Write as _;

use kiln_tokenizer::{Span, TokenKind, TokenValue};

use crate::syntax_kind::{SyntaxKind, SyntaxTrivia};

/// Index of a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind-specific contents of a node.
///
/// Slots that can be missing in a broken document are optional.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Document {
        key_values: Vec<NodeId>,
        tables: Vec<NodeId>,
    },
    /// Shared by `TABLE` and `TABLE_ARRAY`.
    Table {
        open: NodeId,
        key: Option<NodeId>,
        close: Option<NodeId>,
        eol: Option<NodeId>,
        key_values: Vec<NodeId>,
    },
    KeyValue {
        key: NodeId,
        equal: Option<NodeId>,
        value: Option<NodeId>,
        eol: Option<NodeId>,
    },
    Key {
        base: NodeId,
        dotted: Vec<NodeId>,
    },
    DottedKeyItem {
        dot: NodeId,
        segment: Option<NodeId>,
    },
    BareKey {
        token: NodeId,
    },
    /// Shared by `STRING`, `INTEGER`, `FLOAT`, `BOOLEAN` and `DATETIME`.
    Scalar {
        token: NodeId,
        value: TokenValue,
    },
    Array {
        open: NodeId,
        items: Vec<NodeId>,
        close: Option<NodeId>,
    },
    ArrayItem {
        value: Option<NodeId>,
        comma: Option<NodeId>,
    },
    InlineTable {
        open: NodeId,
        items: Vec<NodeId>,
        close: Option<NodeId>,
    },
    InlineTableItem {
        key_value: NodeId,
        comma: Option<NodeId>,
    },
    Token {
        kind: TokenKind,
        /// `None` when the kind has a fixed spelling.
        text: Option<String>,
        span: Span,
    },
}

impl NodePayload {
    /// Children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodePayload::Document { key_values, tables } => {
                out.extend(key_values);
                out.extend(tables);
            }
            NodePayload::Table {
                open,
                key,
                close,
                eol,
                key_values,
            } => {
                out.push(*open);
                out.extend(key);
                out.extend(close);
                out.extend(eol);
                out.extend(key_values);
            }
            NodePayload::KeyValue {
                key,
                equal,
                value,
                eol,
            } => {
                out.push(*key);
                out.extend(equal);
                out.extend(value);
                out.extend(eol);
            }
            NodePayload::Key { base, dotted } => {
                out.push(*base);
                out.extend(dotted);
            }
            NodePayload::DottedKeyItem { dot, segment } => {
                out.push(*dot);
                out.extend(segment);
            }
            NodePayload::BareKey { token } | NodePayload::Scalar { token, .. } => out.push(*token),
            NodePayload::Array { open, items, close }
            | NodePayload::InlineTable { open, items, close } => {
                out.push(*open);
                out.extend(items);
                out.extend(close);
            }
            NodePayload::ArrayItem { value, comma } => {
                out.extend(value);
                out.extend(comma);
            }
            NodePayload::InlineTableItem { key_value, comma } => {
                out.push(*key_value);
                out.extend(comma);
            }
            NodePayload::Token { .. } => {}
        }
        out
    }

    fn fits(&self, kind: SyntaxKind) -> bool {
        match self {
            NodePayload::Document { .. } => kind == SyntaxKind::DOCUMENT,
            NodePayload::Table { .. } => {
                matches!(kind, SyntaxKind::TABLE | SyntaxKind::TABLE_ARRAY)
            }
            NodePayload::KeyValue { .. } => kind == SyntaxKind::KEY_VALUE,
            NodePayload::Key { .. } => kind == SyntaxKind::KEY,
            NodePayload::DottedKeyItem { .. } => kind == SyntaxKind::DOTTED_KEY_ITEM,
            NodePayload::BareKey { .. } => kind == SyntaxKind::BARE_KEY,
            NodePayload::Scalar { .. } => matches!(
                kind,
                SyntaxKind::STRING
                    | SyntaxKind::INTEGER
                    | SyntaxKind::FLOAT
                    | SyntaxKind::BOOLEAN
                    | SyntaxKind::DATETIME
            ),
            NodePayload::Array { .. } => kind == SyntaxKind::ARRAY,
            NodePayload::ArrayItem { .. } => kind == SyntaxKind::ARRAY_ITEM,
            NodePayload::InlineTable { .. } => kind == SyntaxKind::INLINE_TABLE,
            NodePayload::InlineTableItem { .. } => kind == SyntaxKind::INLINE_TABLE_ITEM,
            NodePayload::Token { .. } => kind == SyntaxKind::TOKEN,
        }
    }
}

/// One node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    leading: Vec<SyntaxTrivia>,
    trailing: Vec<SyntaxTrivia>,
    payload: NodePayload,
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn leading(&self) -> &[SyntaxTrivia] {
        &self.leading
    }

    pub fn trailing(&self) -> &[SyntaxTrivia] {
        &self.trailing
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }
}

/// A full-fidelity syntax tree.
///
/// The root is always a `DOCUMENT` node.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// Create a tree holding an empty document.
    pub fn new() -> Self {
        let root = NodeData {
            kind: SyntaxKind::DOCUMENT,
            parent: None,
            leading: Vec::new(),
            trailing: Vec::new(),
            payload: NodePayload::Document {
                key_values: Vec::new(),
                tables: Vec::new(),
            },
        };
        Self { nodes: vec![root] }
    }

    /// The document node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including unattached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree only holds its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Access a node.
    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.get(id).kind
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    #[inline]
    pub fn payload(&self, id: NodeId) -> &NodePayload {
        &self.get(id).payload
    }

    /// Children of a node in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).payload.children()
    }

    /// Add a leaf token. Kinds with a fixed spelling do not keep `text`.
    pub fn add_token(&mut self, kind: TokenKind, text: &str, span: Span) -> NodeId {
        let text = match kind.fixed_text() {
            Some(_) => None,
            None => Some(text.to_string()),
        };
        self.push(SyntaxKind::TOKEN, NodePayload::Token { kind, text, span })
    }

    /// Wrap a literal token in a value node.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not a literal or keyword token.
    pub fn add_scalar(&mut self, token: NodeId, value: TokenValue) -> NodeId {
        let token_kind = self.token_kind(token);
        let Some(kind) = token_kind.and_then(SyntaxKind::scalar_for) else {
            panic!("cannot build a value node from {token_kind:?}");
        };
        self.add_node(kind, NodePayload::Scalar { token, value })
    }

    /// Add an inner node and attach every child listed in its payload.
    ///
    /// # Panics
    ///
    /// Panics if the payload does not belong to `kind`, or if a child
    /// already has a parent.
    pub fn add_node(&mut self, kind: SyntaxKind, payload: NodePayload) -> NodeId {
        assert!(
            payload.fits(kind) && kind != SyntaxKind::DOCUMENT,
            "payload {payload:?} cannot build a {kind:?} node"
        );
        let children = payload.children();
        let id = self.push(kind, payload);
        for child in children {
            self.attach(id, child);
        }
        id
    }

    fn push(&mut self, kind: SyntaxKind, payload: NodePayload) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            leading: Vec::new(),
            trailing: Vec::new(),
            payload,
        });
        id
    }

    /// Record `parent` as the parent of `child`.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent: a node belongs to exactly
    /// one place in the tree.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        let node = &mut self.nodes[child.index()];
        if let Some(existing) = node.parent {
            panic!("node {child:?} already has parent {existing:?}, cannot attach it to {parent:?}");
        }
        node.parent = Some(parent);
    }

    /// Append a top-level key-value to the document.
    pub fn push_document_key_value(&mut self, key_value: NodeId) {
        let root = self.root();
        self.attach(root, key_value);
        if let NodePayload::Document { key_values, .. } = &mut self.nodes[0].payload {
            key_values.push(key_value);
        }
    }

    /// Append a table or table array to the document.
    pub fn push_document_table(&mut self, table: NodeId) {
        let root = self.root();
        self.attach(root, table);
        if let NodePayload::Document { tables, .. } = &mut self.nodes[0].payload {
            tables.push(table);
        }
    }

    pub fn push_leading(&mut self, id: NodeId, trivia: SyntaxTrivia) {
        self.nodes[id.index()].leading.push(trivia);
    }

    pub fn push_trailing(&mut self, id: NodeId, trivia: SyntaxTrivia) {
        self.nodes[id.index()].trailing.push(trivia);
    }

    /// The token kind of a `TOKEN` node.
    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        match self.payload(id) {
            NodePayload::Token { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The text of a `TOKEN` node, without trivia.
    pub fn token_text(&self, id: NodeId) -> Option<&str> {
        match self.payload(id) {
            NodePayload::Token { kind, text, .. } => text.as_deref().or(kind.fixed_text()),
            _ => None,
        }
    }

    /// Pre-order iteration over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Source range of the tokens under `id`, trivia excluded.
    ///
    /// `None` for a node without tokens (an empty document).
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.descendants(id)
            .filter_map(|node| match self.payload(node) {
                NodePayload::Token { span, .. } => Some(*span),
                _ => None,
            })
            .reduce(|acc, span| acc.extend(span))
    }

    /// Indented dump of kinds, token text and trivia, for tests and debugging.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.get(id);
            let _ = write!(out, "{:indent$}{:?}", "", node.kind, indent = depth * 2);
            if let NodePayload::Token { kind, .. } = &node.payload {
                let _ = write!(out, " {:?} {:?}", kind, self.token_text(id).unwrap_or(""));
            }
            if !node.leading.is_empty() {
                let texts: Vec<&str> = node.leading.iter().map(|t| t.text.as_str()).collect();
                let _ = write!(out, " leading={texts:?}");
            }
            if !node.trailing.is_empty() {
                let texts: Vec<&str> = node.trailing.iter().map(|t| t.text.as_str()).collect();
                let _ = write!(out, " trailing={texts:?}");
            }
            out.push('\n');
            for child in node.payload.children().into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

/// Iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).into_iter().rev());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_key(tree: &mut SyntaxTree, name: &str, at: u32) -> NodeId {
        let token = tree.add_token(
            TokenKind::BasicKey,
            name,
            Span::new(at, at + name.len() as u32),
        );
        let bare = tree.add_node(SyntaxKind::BARE_KEY, NodePayload::BareKey { token });
        tree.add_node(
            SyntaxKind::KEY,
            NodePayload::Key {
                base: bare,
                dotted: Vec::new(),
            },
        )
    }

    #[test]
    fn fixed_spelling_is_not_stored() {
        let mut tree = SyntaxTree::new();
        let eq = tree.add_token(TokenKind::Equal, "=", Span::new(0, 1));
        assert_eq!(
            tree.payload(eq),
            &NodePayload::Token {
                kind: TokenKind::Equal,
                text: None,
                span: Span::new(0, 1)
            }
        );
        assert_eq!(tree.token_text(eq), Some("="));
    }

    #[test]
    fn children_get_parents() {
        let mut tree = SyntaxTree::new();
        let key = bare_key(&mut tree, "a", 0);
        let kv = tree.add_node(
            SyntaxKind::KEY_VALUE,
            NodePayload::KeyValue {
                key,
                equal: None,
                value: None,
                eol: None,
            },
        );
        tree.push_document_key_value(kv);
        assert_eq!(tree.parent(key), Some(kv));
        assert_eq!(tree.parent(kv), Some(tree.root()));
        assert_eq!(tree.span(kv), Some(Span::new(0, 1)));
    }

    #[test]
    #[should_panic(expected = "already has parent")]
    fn attaching_twice_panics() {
        let mut tree = SyntaxTree::new();
        let key = bare_key(&mut tree, "a", 0);
        let kv = |key| NodePayload::KeyValue {
            key,
            equal: None,
            value: None,
            eol: None,
        };
        tree.add_node(SyntaxKind::KEY_VALUE, kv(key));
        tree.add_node(SyntaxKind::KEY_VALUE, kv(key));
    }

    #[test]
    #[should_panic(expected = "cannot build a value node")]
    fn scalar_from_wrong_token_panics() {
        let mut tree = SyntaxTree::new();
        let comma = tree.add_token(TokenKind::Comma, ",", Span::new(0, 1));
        tree.add_scalar(comma, TokenValue::Integer(1));
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut tree = SyntaxTree::new();
        let key = bare_key(&mut tree, "a", 0);
        let kinds: Vec<SyntaxKind> = tree.descendants(key).map(|id| tree.kind(id)).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::KEY, SyntaxKind::BARE_KEY, SyntaxKind::TOKEN]
        );
    }
}
