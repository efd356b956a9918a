//! Recursive-descent parser building a [`SyntaxTree`].
//!
//! The parser pulls one significant token at a time from the lexer, telling
//! it which [`LexMode`] the grammar expects. Whitespace and comments never
//! reach the grammar: they are folded into the trivia of the neighbouring
//! tokens as soon as they are lexed. Newlines are significant at the end of
//! key-values and table headers and trivia everywhere else.

use kiln_tokenizer::{
    Checkpoint, DiagnosticBag, LexMode, Lexer, SourceView, Span, Token, TokenKind, TokenValue,
};
use tracing::{debug, trace};

use crate::syntax_kind::{SyntaxKind, SyntaxTrivia};
use crate::tree::{NodeId, NodePayload, SyntaxTree};

/// Arrays and inline tables nested deeper than this are rejected.
pub const MAX_NESTING: usize = 128;

/// The result of parsing: a tree plus the lexing and parsing diagnostics.
#[derive(Debug, Clone)]
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: DiagnosticBag,
}

impl Parse {
    /// The syntax tree. Always present, even for broken input.
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Lex and parse diagnostics, in the order they were found.
    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// Check if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Split into the tree and the diagnostics.
    pub fn into_parts(self) -> (SyntaxTree, DiagnosticBag) {
        (self.tree, self.diagnostics)
    }
}

/// Parse a source view into a syntax tree.
pub fn parse_source(view: &SourceView<'_>) -> Parse {
    debug!(
        path = view.path().map(|p| &**p),
        len = view.text().len(),
        "parsing"
    );
    let parse = Parser::new(view).parse();
    debug!(
        nodes = parse.tree.len(),
        diagnostics = parse.diagnostics.len(),
        "parsed"
    );
    parse
}

/// Whether a token can start a key segment.
fn is_key_start(kind: TokenKind) -> bool {
    kind == TokenKind::BasicKey || kind.is_string()
}

/// Whether a token can start a value.
fn is_value_start(kind: TokenKind) -> bool {
    SyntaxKind::scalar_for(kind).is_some()
        || matches!(
            kind,
            TokenKind::OpenBracket | TokenKind::OpenBrace | TokenKind::Invalid
        )
}

/// The next significant token, and where the lexer was before reading it.
struct Lookahead<'src> {
    token: Token<'src>,
    mode: LexMode,
    checkpoint: Checkpoint,
}

struct Parser<'src> {
    view: &'src SourceView<'src>,
    lexer: Lexer<'src>,
    tree: SyntaxTree,
    diagnostics: DiagnosticBag,
    current: Option<Lookahead<'src>>,
    /// Trivia waiting for the next token, as its leading trivia.
    pending: Vec<SyntaxTrivia>,
    /// The most recently added token node.
    last_token: Option<NodeId>,
    /// Whether trivia still belongs to `last_token` (no newline seen since).
    attach_trailing: bool,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn new(view: &'src SourceView<'src>) -> Self {
        Self {
            view,
            lexer: Lexer::new(view),
            tree: SyntaxTree::new(),
            diagnostics: DiagnosticBag::new(),
            current: None,
            pending: Vec::new(),
            last_token: None,
            attach_trailing: false,
            depth: 0,
        }
    }

    fn parse(mut self) -> Parse {
        for key_value in self.parse_key_values() {
            self.tree.push_document_key_value(key_value);
        }

        loop {
            match self.peek(LexMode::Key) {
                TokenKind::OpenBracket => {
                    let table = self.parse_table(false);
                    self.tree.push_document_table(table);
                }
                TokenKind::OpenBracketDouble => {
                    let table = self.parse_table(true);
                    self.tree.push_document_table(table);
                }
                _ => break,
            }
        }

        // Whatever is left before the end of input closes the document.
        let root = self.tree.root();
        for trivia in std::mem::take(&mut self.pending) {
            self.tree.push_trailing(root, trivia);
        }

        Parse {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    // Token plumbing

    /// Kind of the next significant token, lexed in `mode`.
    ///
    /// Whitespace and comments in front of it are consumed as trivia. A
    /// token already looked at in another mode is lexed again.
    fn peek(&mut self, mode: LexMode) -> TokenKind {
        if let Some(lookahead) = &self.current
            && lookahead.mode != mode
        {
            self.lexer.rewind(lookahead.checkpoint);
            self.current = None;
        }

        while self.current.is_none() {
            let checkpoint = self.lexer.checkpoint();
            let token = self.lexer.next_token(mode);
            if matches!(token.kind, TokenKind::Whitespaces | TokenKind::Comment) {
                self.flush_lexer_diagnostics(true);
                self.push_trivia(SyntaxTrivia::from_token(&token));
            } else {
                self.current = Some(Lookahead {
                    token,
                    mode,
                    checkpoint,
                });
            }
        }

        self.current
            .as_ref()
            .map_or(TokenKind::Eof, |lookahead| lookahead.token.kind)
    }

    /// Span of the token returned by the last `peek`.
    fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map_or(Span::empty(self.lexer.position()), |lookahead| {
                lookahead.token.span
            })
    }

    /// Take the next significant token.
    fn take(&mut self, mode: LexMode) -> Token<'src> {
        self.peek(mode);
        match self.current.take() {
            Some(lookahead) => lookahead.token,
            None => Token::new(
                TokenKind::Eof,
                Span::empty(self.lexer.position()),
                "",
            ),
        }
    }

    /// Take the next significant token and add it to the tree.
    fn bump(&mut self, mode: LexMode) -> NodeId {
        let token = self.take(mode);
        self.add_token(&token)
    }

    fn add_token(&mut self, token: &Token<'src>) -> NodeId {
        self.flush_lexer_diagnostics(true);
        let id = self.tree.add_token(token.kind, token.text, token.span);
        for trivia in std::mem::take(&mut self.pending) {
            self.tree.push_leading(id, trivia);
        }
        self.last_token = Some(id);
        self.attach_trailing = token.kind != TokenKind::NewLine;
        id
    }

    fn push_trivia(&mut self, trivia: SyntaxTrivia) {
        match self.last_token {
            Some(last) if self.attach_trailing => self.tree.push_trailing(last, trivia),
            _ => self.pending.push(trivia),
        }
    }

    /// Keep a token the grammar cannot use as skipped trivia.
    fn skip(&mut self, token: &Token<'src>, keep_diagnostics: bool) {
        trace!("Skipping {:?} at {:?}", token.kind, token.span);
        self.flush_lexer_diagnostics(keep_diagnostics);
        self.push_trivia(SyntaxTrivia::from_token(token));
    }

    fn skip_current(&mut self, mode: LexMode, keep_diagnostics: bool) {
        let token = self.take(mode);
        self.skip(&token, keep_diagnostics);
    }

    /// Consume newlines as trivia.
    fn eat_newlines(&mut self, mode: LexMode) {
        while self.peek(mode) == TokenKind::NewLine {
            let token = self.take(mode);
            self.flush_lexer_diagnostics(true);
            self.push_trivia(SyntaxTrivia::from_token(&token));
            self.attach_trailing = false;
        }
    }

    /// Skip everything up to the end of the line. Problems inside the
    /// skipped text are not reported.
    fn recover(&mut self) {
        while !matches!(
            self.peek(LexMode::Value),
            TokenKind::NewLine | TokenKind::Eof
        ) {
            self.skip_current(LexMode::Value, false);
        }
    }

    fn flush_lexer_diagnostics(&mut self, keep: bool) {
        let drained = self.lexer.drain_diagnostics();
        if keep {
            self.diagnostics.extend(drained);
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        let span = self.view.source_span(span);
        self.diagnostics.error(span, message);
    }

    /// Report a problem at the token returned by the last `peek`.
    fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error(span, message);
    }

    // Grammar

    /// Key-values up to the next table header or the end of input.
    fn parse_key_values(&mut self) -> Vec<NodeId> {
        let mut key_values = Vec::new();
        loop {
            self.eat_newlines(LexMode::Key);
            match self.peek(LexMode::Key) {
                TokenKind::Eof | TokenKind::OpenBracket | TokenKind::OpenBracketDouble => break,
                kind if is_key_start(kind) => key_values.push(self.parse_key_value(false)),
                kind => {
                    if kind != TokenKind::Invalid {
                        self.error_at_current("expecting a key");
                    }
                    self.skip_current(LexMode::Key, true);
                    self.recover();
                }
            }
        }
        key_values
    }

    /// `[key]` or `[[key]]` followed by the key-values of its body.
    fn parse_table(&mut self, array: bool) -> NodeId {
        trace!(array, "parse_table");
        let errors_before = self.diagnostics.len();
        let open = self.bump(LexMode::Key);

        let key = if is_key_start(self.peek(LexMode::Key)) {
            Some(self.parse_key())
        } else {
            self.error_at_current("expecting a key");
            None
        };

        let (close_kind, message) = if array {
            (
                TokenKind::CloseBracketDouble,
                "expecting `]]` to close the table array",
            )
        } else {
            (TokenKind::CloseBracket, "expecting `]` to close the table")
        };
        let close = if self.peek(LexMode::Key) == close_kind {
            Some(self.bump(LexMode::Key))
        } else {
            if self.diagnostics.len() == errors_before {
                self.error_at_current(message);
            }
            None
        };

        let eol = self.finish_line(errors_before, "a table header");
        let key_values = self.parse_key_values();

        let kind = if array {
            SyntaxKind::TABLE_ARRAY
        } else {
            SyntaxKind::TABLE
        };
        let id = self.tree.add_node(
            kind,
            NodePayload::Table {
                open,
                key,
                close,
                eol,
                key_values,
            },
        );
        trace!("Finished {:?} {:?}", kind, id);
        id
    }

    /// Expect the end of a line, skipping the rest of it if the line
    /// already had a problem.
    fn finish_line(&mut self, errors_before: usize, what: &str) -> Option<NodeId> {
        if self.diagnostics.len() > errors_before {
            self.recover();
        }
        match self.peek(LexMode::Key) {
            TokenKind::NewLine => Some(self.bump(LexMode::Key)),
            TokenKind::Eof => None,
            _ => {
                self.error_at_current(format!("expecting a newline after {what}"));
                self.recover();
                match self.peek(LexMode::Key) {
                    TokenKind::NewLine => Some(self.bump(LexMode::Key)),
                    _ => None,
                }
            }
        }
    }

    /// `key = value`, with the end of line unless inside an inline table.
    fn parse_key_value(&mut self, inline: bool) -> NodeId {
        let errors_before = self.diagnostics.len();
        let key = self.parse_key();

        let (equal, value) = if self.peek(LexMode::Key) == TokenKind::Equal {
            let equal = self.bump(LexMode::Key);
            (Some(equal), self.parse_value())
        } else {
            self.error_at_current("expecting `=` after a key");
            (None, None)
        };

        let eol = if inline {
            None
        } else {
            self.finish_line(errors_before, "a key-value")
        };

        let id = self.tree.add_node(
            SyntaxKind::KEY_VALUE,
            NodePayload::KeyValue {
                key,
                equal,
                value,
                eol,
            },
        );
        trace!("Finished KEY_VALUE {:?}", id);
        id
    }

    /// A possibly dotted key. The next token must be a key start.
    fn parse_key(&mut self) -> NodeId {
        let base = self.parse_key_segment();
        let mut dotted = Vec::new();
        while self.peek(LexMode::Key) == TokenKind::Dot {
            let dot = self.bump(LexMode::Key);
            let segment = if is_key_start(self.peek(LexMode::Key)) {
                Some(self.parse_key_segment())
            } else {
                self.error_at_current("expecting a key");
                None
            };
            let missing = segment.is_none();
            dotted.push(
                self.tree
                    .add_node(SyntaxKind::DOTTED_KEY_ITEM, NodePayload::DottedKeyItem {
                        dot,
                        segment,
                    }),
            );
            if missing {
                break;
            }
        }
        self.tree
            .add_node(SyntaxKind::KEY, NodePayload::Key { base, dotted })
    }

    fn parse_key_segment(&mut self) -> NodeId {
        let token = self.take(LexMode::Key);
        let id = self.add_token(&token);
        if token.kind == TokenKind::BasicKey {
            return self
                .tree
                .add_node(SyntaxKind::BARE_KEY, NodePayload::BareKey { token: id });
        }

        if matches!(
            token.kind,
            TokenKind::StringMulti | TokenKind::StringLiteralMulti
        ) {
            self.error(token.span, "multi-line strings are not allowed as keys");
        }
        let value = token
            .value
            .unwrap_or_else(|| TokenValue::String(String::new()));
        self.tree.add_scalar(id, value)
    }

    /// A value, or `None` after reporting why there is none.
    fn parse_value(&mut self) -> Option<NodeId> {
        match self.peek(LexMode::Value) {
            TokenKind::OpenBracket | TokenKind::OpenBrace if self.depth >= MAX_NESTING => {
                self.error_at_current("arrays and inline tables are nested too deeply");
                self.recover();
                None
            }
            TokenKind::OpenBracket => Some(self.parse_array()),
            TokenKind::OpenBrace => Some(self.parse_inline_table()),
            TokenKind::Invalid => {
                self.skip_current(LexMode::Value, true);
                None
            }
            kind if SyntaxKind::scalar_for(kind).is_some() => {
                let token = self.take(LexMode::Value);
                let Some(value) = token.value.clone() else {
                    self.skip(&token, true);
                    return None;
                };
                let id = self.add_token(&token);
                Some(self.tree.add_scalar(id, value))
            }
            _ => {
                self.error_at_current("expecting a value");
                None
            }
        }
    }

    /// `[ value, ... ]`, newlines and comments allowed between items.
    fn parse_array(&mut self) -> NodeId {
        self.depth += 1;
        let open = self.bump(LexMode::Value);
        let mut items = Vec::new();
        let mut close = None;

        loop {
            self.eat_newlines(LexMode::Value);
            match self.peek(LexMode::Value) {
                TokenKind::CloseBracket => {
                    close = Some(self.bump(LexMode::Value));
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current("expecting `]` to close the array");
                    break;
                }
                _ => {}
            }

            let value = self.parse_value();
            self.eat_newlines(LexMode::Value);
            let comma = if self.peek(LexMode::Value) == TokenKind::Comma {
                Some(self.bump(LexMode::Value))
            } else {
                None
            };

            if value.is_none() && comma.is_none() {
                if !matches!(
                    self.peek(LexMode::Value),
                    TokenKind::CloseBracket | TokenKind::Eof
                ) {
                    self.skip_current(LexMode::Value, false);
                }
                continue;
            }

            items.push(
                self.tree
                    .add_node(SyntaxKind::ARRAY_ITEM, NodePayload::ArrayItem { value, comma }),
            );

            if comma.is_none() {
                let kind = self.peek(LexMode::Value);
                if !matches!(kind, TokenKind::CloseBracket | TokenKind::Eof) {
                    self.error_at_current("expecting `,` or `]`");
                    if !is_value_start(kind) {
                        self.skip_current(LexMode::Value, false);
                    }
                }
            }
        }

        self.depth -= 1;
        let id = self
            .tree
            .add_node(SyntaxKind::ARRAY, NodePayload::Array { open, items, close });
        trace!("Finished ARRAY {:?}", id);
        id
    }

    /// `{ key = value, ... }` on a single line.
    fn parse_inline_table(&mut self) -> NodeId {
        self.depth += 1;
        let open = self.bump(LexMode::Value);
        let mut items = Vec::new();
        let mut close = None;
        let mut trailing_comma: Option<Span> = None;

        loop {
            match self.peek(LexMode::Key) {
                TokenKind::CloseBrace => {
                    if let Some(span) = trailing_comma {
                        self.error(span, "trailing commas are not allowed in inline tables");
                    }
                    close = Some(self.bump(LexMode::Key));
                    break;
                }
                TokenKind::NewLine => {
                    self.error_at_current("newlines are not allowed in inline tables");
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current("expecting `}` to close the inline table");
                    break;
                }
                kind if is_key_start(kind) => {
                    let key_value = self.parse_key_value(true);
                    let comma = if self.peek(LexMode::Key) == TokenKind::Comma {
                        trailing_comma = Some(self.current_span());
                        Some(self.bump(LexMode::Key))
                    } else {
                        trailing_comma = None;
                        None
                    };
                    items.push(self.tree.add_node(
                        SyntaxKind::INLINE_TABLE_ITEM,
                        NodePayload::InlineTableItem { key_value, comma },
                    ));

                    let kind = self.peek(LexMode::Key);
                    if comma.is_none()
                        && !matches!(
                            kind,
                            TokenKind::CloseBrace | TokenKind::NewLine | TokenKind::Eof
                        )
                    {
                        self.error_at_current("expecting `,` or `}`");
                        if !is_key_start(kind) {
                            self.skip_current(LexMode::Key, false);
                        }
                    }
                }
                _ => {
                    self.error_at_current("expecting a key");
                    trailing_comma = None;
                    self.skip_current(LexMode::Key, true);
                }
            }
        }

        self.depth -= 1;
        let id = self.tree.add_node(
            SyntaxKind::INLINE_TABLE,
            NodePayload::InlineTable { open, items, close },
        );
        trace!("Finished INLINE_TABLE {:?}", id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::to_text;

    fn parse(source: &str) -> Parse {
        let view = SourceView::new(source);
        parse_source(&view)
    }

    fn parse_ok(source: &str) -> SyntaxTree {
        let parse = parse(source);
        assert!(
            parse.is_ok(),
            "unexpected errors for {source:?}:\n{}",
            parse.diagnostics()
        );
        parse.into_parts().0
    }

    fn messages(source: &str) -> Vec<String> {
        parse(source)
            .diagnostics()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    fn assert_round_trip(source: &str) {
        let parse = parse(source);
        assert_eq!(to_text(parse.tree(), parse.tree().root()), source);
    }

    #[test]
    fn test_empty_document() {
        let tree = parse_ok("");
        assert!(tree.is_empty());
        assert_eq!(to_text(&tree, tree.root()), "");
    }

    #[test]
    fn test_simple_key_value() {
        let tree = parse_ok("name = \"kiln\"\n");
        insta::assert_snapshot!(tree.debug_dump(), @r#"
        DOCUMENT
          KEY_VALUE
            KEY
              BARE_KEY
                TOKEN BasicKey "name" trailing=[" "]
            TOKEN Equal "=" trailing=[" "]
            STRING
              TOKEN String "\"kiln\""
            TOKEN NewLine "\n"
        "#);
    }

    #[test]
    fn test_comments_lead_the_next_line() {
        let tree = parse_ok("a = 1 # one\n\n# two\nb = 2\n");
        insta::assert_snapshot!(tree.debug_dump(), @r##"
        DOCUMENT
          KEY_VALUE
            KEY
              BARE_KEY
                TOKEN BasicKey "a" trailing=[" "]
            TOKEN Equal "=" trailing=[" "]
            INTEGER
              TOKEN Integer "1" trailing=[" ", "# one"]
            TOKEN NewLine "\n"
          KEY_VALUE
            KEY
              BARE_KEY
                TOKEN BasicKey "b" leading=["\n", "# two", "\n"] trailing=[" "]
            TOKEN Equal "=" trailing=[" "]
            INTEGER
              TOKEN Integer "2"
            TOKEN NewLine "\n"
        "##);
    }

    #[test]
    fn test_tables_own_their_key_values() {
        let tree = parse_ok("top = 1\n[server]\nport = 80\n[[peer]]\nhost = \"a\"\n");
        let root = tree.root();
        let NodePayload::Document { key_values, tables } = tree.payload(root) else {
            panic!("root is not a document");
        };
        assert_eq!(key_values.len(), 1);
        assert_eq!(tables.len(), 2);
        assert_eq!(tree.kind(tables[0]), SyntaxKind::TABLE);
        assert_eq!(tree.kind(tables[1]), SyntaxKind::TABLE_ARRAY);
        let NodePayload::Table { key_values, .. } = tree.payload(tables[0]) else {
            panic!("not a table");
        };
        assert_eq!(key_values.len(), 1);
    }

    #[test]
    fn test_dotted_and_quoted_keys() {
        let tree = parse_ok("a . \"b\" .'c' = true\n");
        let key = tree
            .descendants(tree.root())
            .find(|&id| tree.kind(id) == SyntaxKind::KEY)
            .unwrap();
        let NodePayload::Key { dotted, .. } = tree.payload(key) else {
            panic!("not a key");
        };
        assert_eq!(dotted.len(), 2);
    }

    #[test]
    fn test_arrays_span_lines() {
        let source = "a = [\n  1, # one\n  2,\n]\n";
        let tree = parse_ok(source);
        assert_eq!(to_text(&tree, tree.root()), source);
        let array = tree
            .descendants(tree.root())
            .find(|&id| tree.kind(id) == SyntaxKind::ARRAY)
            .unwrap();
        let NodePayload::Array { items, close, .. } = tree.payload(array) else {
            panic!("not an array");
        };
        assert_eq!(items.len(), 2);
        assert!(close.is_some());
    }

    #[test]
    fn test_nested_values() {
        let source = "point = { x = 1, y = [2.5, -inf], when = 1979-05-27T07:32:00Z }\n";
        let tree = parse_ok(source);
        let kinds: Vec<SyntaxKind> = tree
            .descendants(tree.root())
            .map(|id| tree.kind(id))
            .filter(|kind| kind.is_value())
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::INLINE_TABLE,
                SyntaxKind::INTEGER,
                SyntaxKind::ARRAY,
                SyntaxKind::FLOAT,
                SyntaxKind::FLOAT,
                SyntaxKind::DATETIME,
            ]
        );
    }

    #[test]
    fn test_crlf_and_no_final_newline() {
        assert_round_trip("a = 1\r\nb = 'x'");
        parse_ok("a = 1\r\nb = 'x'");
    }

    #[test]
    fn test_missing_equal() {
        assert_eq!(messages("a 1\n"), vec!["expecting `=` after a key"]);
        assert_round_trip("a 1\n");
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(messages("a =\nb = 1\n"), vec!["expecting a value"]);
    }

    #[test]
    fn test_garbage_after_value() {
        assert_eq!(
            messages("a = 1 2\nb = 3\n"),
            vec!["expecting a newline after a key-value"]
        );
        assert_round_trip("a = 1 2\nb = 3\n");
    }

    #[test]
    fn test_unexpected_token_at_line_start() {
        let source = "= 1\nb = 2\n";
        assert_eq!(messages(source), vec!["expecting a key"]);
        assert_round_trip(source);
        let parse = parse(source);
        let NodePayload::Document { key_values, .. } = parse.tree().payload(parse.tree().root())
        else {
            panic!("root is not a document");
        };
        assert_eq!(key_values.len(), 1);
    }

    #[test]
    fn test_unclosed_table_header() {
        assert_eq!(
            messages("[a\nb = 1\n"),
            vec!["expecting `]` to close the table"]
        );
        assert_eq!(
            messages("[[a]\nb = 1\n"),
            vec!["expecting `]]` to close the table array"]
        );
    }

    #[test]
    fn test_multiline_string_key() {
        assert_eq!(
            messages("\"\"\"a\"\"\" = 1\n"),
            vec!["multi-line strings are not allowed as keys"]
        );
    }

    #[test]
    fn test_array_errors() {
        assert_eq!(messages("a = [1 2]\n"), vec!["expecting `,` or `]`"]);
        assert_eq!(messages("a = [1,"), vec!["expecting `]` to close the array"]);
        assert_round_trip("a = [1 2]\n");
        assert_round_trip("a = [1,");
    }

    #[test]
    fn test_inline_table_errors() {
        assert_eq!(
            messages("a = { b = 1, }\n"),
            vec!["trailing commas are not allowed in inline tables"]
        );
        assert_eq!(
            messages("a = { b = 1\n}\n")[0],
            "newlines are not allowed in inline tables"
        );
        assert_eq!(
            messages("a = { b = 1 c = 2 }\n"),
            vec!["expecting `,` or `}`"]
        );
        assert_eq!(
            messages("a = { b = 1"),
            vec!["expecting `}` to close the inline table"]
        );
        assert_round_trip("a = { b = 1\n}\n");
    }

    #[test]
    fn test_lexer_errors_are_reported_once() {
        assert_eq!(
            messages("a = 1__0\n"),
            vec!["underscores in numbers must be surrounded by digits"]
        );
        assert_eq!(messages("a = nope\n"), vec!["invalid value `nope`"]);
    }

    #[test]
    fn test_recovery_continues_on_next_line() {
        let parse = parse("a = \nb = ]\nc = 3\n");
        assert_eq!(parse.diagnostics().len(), 2);
        let tree = parse.tree();
        let integers = tree
            .descendants(tree.root())
            .filter(|&id| tree.kind(id) == SyntaxKind::INTEGER)
            .count();
        assert_eq!(integers, 1);
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING + 10;
        let source = format!("a = {}{}\n", "[".repeat(depth), "]".repeat(depth));
        let parse = parse(&source);
        assert!(!parse.is_ok());
        assert_eq!(
            parse.diagnostics().iter().next().unwrap().message,
            "arrays and inline tables are nested too deeply"
        );
        assert_eq!(to_text(parse.tree(), parse.tree().root()), source);
    }

    #[test]
    fn test_nesting_below_limit() {
        let depth = MAX_NESTING;
        let source = format!("a = {}{}\n", "[".repeat(depth), "]".repeat(depth));
        let tree = parse_ok(&source);
        assert_eq!(to_text(&tree, tree.root()), source);
    }
}
