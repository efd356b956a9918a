//! Lossless syntax tree for kiln configuration documents.
//!
//! kiln documents use a TOML-like syntax: key-values, `[table]` and
//! `[[table-array]]` headers, arrays and single-line inline tables. This
//! crate parses them into a syntax tree that keeps every byte of the input
//! (whitespace, comments and even text that could not be parsed) as trivia,
//! so printing the tree gives back the original text.
//!
//! # Features
//!
//! - **Lossless representation**: `parse(s).to_string() == s`
//! - **Error recovery**: one broken line does not hide problems elsewhere
//! - **Typed AST layer**: views with decoded scalar values
//! - **Semantic validation**: duplicate keys, tables defined twice, table
//!   arrays extended in incompatible ways
//!
//! # Example
//!
//! ```
//! use kiln_cst::parse;
//!
//! let source = r#"
//! title = "example"
//!
//! [server]
//! port = 8080 # default
//! "#;
//!
//! let doc = parse(source);
//! assert!(!doc.has_errors());
//!
//! let server = doc.root().tables().next().unwrap();
//! let port = server.key_values().next().unwrap();
//! assert_eq!(port.value().unwrap().as_integer(), Some(8080));
//!
//! // Roundtrip: source can be exactly reconstructed
//! assert_eq!(doc.to_string(), source);
//! ```
//!
//! # Validation
//!
//! ```
//! use kiln_cst::parse;
//!
//! let doc = parse("a = 1\na = 2\n");
//! assert!(doc.has_errors());
//! assert_eq!(
//!     doc.diagnostics().to_string(),
//!     "(2,1)-(2,2) : error : the key `a` is already defined\n"
//! );
//! ```

pub mod ast;
pub mod document;
pub mod parser;
pub mod printer;
pub mod report;
pub mod syntax_kind;
pub mod tree;
pub mod validation;

pub use ast::{
    ArrayNode, AstNode, DocumentNode, InlineTableNode, KeyNode, KeyValueNode, TableNode,
    ValueKind, ValueNode,
};
pub use document::{Document, ParseMode, ParseOptions, parse, parse_bytes, parse_with};
pub use parser::{MAX_NESTING, Parse, parse_source};
pub use syntax_kind::{SyntaxKind, SyntaxTrivia, TriviaKind};
pub use tree::{NodeData, NodeId, NodePayload, SyntaxTree};
pub use validation::{
    ObjectKind, ObjectPath, PathEntry, PathSegment, PathTable, ValidateOptions, validate,
};

// Re-export the source and diagnostic types callers need alongside a document.
pub use kiln_tokenizer::{
    DateTimeKind, Diagnostic, DiagnosticBag, Severity, SourceSpan, SourceView, Span, TokenKind,
    TokenValue, TomlDateTime,
};
