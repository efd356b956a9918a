//! Writes a syntax tree back to text.
//!
//! Printing is "leading trivia, token text or children, trailing trivia" for
//! every node. The walk uses an explicit stack so deeply nested arrays do not
//! grow the call stack.

use std::fmt;

use crate::syntax_kind::SyntaxTrivia;
use crate::tree::{NodeId, NodePayload, SyntaxTree};

enum Frame {
    /// Print the node's leading trivia and contents.
    Enter(NodeId),
    /// Print the node's trailing trivia once its children are done.
    Trailing(NodeId),
}

/// Print the subtree rooted at `id`.
pub fn print(tree: &SyntaxTree, id: NodeId, out: &mut impl fmt::Write) -> fmt::Result {
    let mut stack = vec![Frame::Enter(id)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                let node = tree.get(id);
                write_trivia(node.leading(), out)?;
                match node.payload() {
                    NodePayload::Token { kind, text, .. } => {
                        let text = text.as_deref().or(kind.fixed_text()).unwrap_or("");
                        out.write_str(text)?;
                        write_trivia(node.trailing(), out)?;
                    }
                    payload => {
                        stack.push(Frame::Trailing(id));
                        stack.extend(payload.children().into_iter().rev().map(Frame::Enter));
                    }
                }
            }
            Frame::Trailing(id) => write_trivia(tree.get(id).trailing(), out)?,
        }
    }
    Ok(())
}

/// Print the subtree rooted at `id` into a new string.
pub fn to_text(tree: &SyntaxTree, id: NodeId) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = print(tree, id, &mut out);
    out
}

fn write_trivia(trivia: &[SyntaxTrivia], out: &mut impl fmt::Write) -> fmt::Result {
    for t in trivia {
        out.write_str(&t.text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_kind::{SyntaxKind, TriviaKind};
    use kiln_tokenizer::{Span, TokenKind, TokenValue};

    #[test]
    fn prints_fixed_and_stored_text_with_trivia() {
        let mut tree = SyntaxTree::new();
        let key_token = tree.add_token(TokenKind::BasicKey, "port", Span::new(0, 4));
        tree.push_trailing(key_token, SyntaxTrivia::new(TriviaKind::Whitespace, " "));
        let bare = tree.add_node(SyntaxKind::BARE_KEY, NodePayload::BareKey { token: key_token });
        let key = tree.add_node(
            SyntaxKind::KEY,
            NodePayload::Key {
                base: bare,
                dotted: Vec::new(),
            },
        );
        let equal = tree.add_token(TokenKind::Equal, "=", Span::new(5, 6));
        tree.push_trailing(equal, SyntaxTrivia::new(TriviaKind::Whitespace, " "));
        let number = tree.add_token(TokenKind::Integer, "80", Span::new(7, 9));
        let value = tree.add_scalar(number, TokenValue::Integer(80));
        let kv = tree.add_node(
            SyntaxKind::KEY_VALUE,
            NodePayload::KeyValue {
                key,
                equal: Some(equal),
                value: Some(value),
                eol: None,
            },
        );
        tree.push_leading(key_token, SyntaxTrivia::new(TriviaKind::Comment, "# web\n"));
        tree.push_document_key_value(kv);

        assert_eq!(to_text(&tree, tree.root()), "# web\nport = 80");
        assert_eq!(to_text(&tree, value), "80");
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let mut tree = SyntaxTree::new();
        let mut inner: Option<NodeId> = None;
        for _ in 0..depth {
            let open = tree.add_token(TokenKind::OpenBracket, "[", Span::new(0, 1));
            let items = match inner {
                Some(value) => vec![tree.add_node(
                    SyntaxKind::ARRAY_ITEM,
                    NodePayload::ArrayItem {
                        value: Some(value),
                        comma: None,
                    },
                )],
                None => Vec::new(),
            };
            let close = tree.add_token(TokenKind::CloseBracket, "]", Span::new(1, 2));
            inner = Some(tree.add_node(
                SyntaxKind::ARRAY,
                NodePayload::Array {
                    open,
                    items,
                    close: Some(close),
                },
            ));
        }

        let text = to_text(&tree, inner.unwrap());
        assert_eq!(text, format!("{}{}", "[".repeat(depth), "]".repeat(depth)));
    }
}
