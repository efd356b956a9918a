//! Parsed documents and the parse entry points.

use std::fmt;
use std::sync::Arc;

use kiln_tokenizer::{DiagnosticBag, SourceView};
use tracing::debug;

use crate::ast::{AstNode, DocumentNode};
use crate::parser::parse_source;
use crate::printer;
use crate::report;
use crate::tree::SyntaxTree;
use crate::validation::{self, PathTable, ValidateOptions};

/// How far [`parse_with`] goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Lex and parse only. Call [`Document::validate`] later if needed.
    ParseOnly,
    /// Parse, then validate when parsing found no errors.
    #[default]
    ParseAndValidate,
}

/// Options for [`parse_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    pub validate: ValidateOptions,
}

impl ParseOptions {
    /// Skip validation.
    pub fn parse_only(mut self) -> Self {
        self.mode = ParseMode::ParseOnly;
        self
    }

    /// Reject arrays mixing element types when validating.
    pub fn homogeneous_arrays(mut self, enabled: bool) -> Self {
        self.validate.homogeneous_arrays = enabled;
        self
    }
}

/// A parsed document: the syntax tree, every diagnostic found so far, and
/// the text it was parsed from.
#[derive(Debug, Clone)]
pub struct Document {
    tree: SyntaxTree,
    diagnostics: DiagnosticBag,
    source_path: Option<Arc<str>>,
    text: String,
    paths: Option<PathTable>,
    validate_options: ValidateOptions,
}

impl Document {
    /// Whether any lex, parse or validation error was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Typed view of the document node.
    pub fn root(&self) -> DocumentNode<'_> {
        DocumentNode::cast(&self.tree, self.tree.root())
            .unwrap_or_else(|| unreachable!("the root of a syntax tree is a document"))
    }

    /// The path used in diagnostics, if one was given.
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// The decoded text the document was parsed from.
    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// The declared paths, once validated.
    pub fn paths(&self) -> Option<&PathTable> {
        self.paths.as_ref()
    }

    pub fn is_validated(&self) -> bool {
        self.paths.is_some()
    }

    /// Write the document back out, byte for byte.
    pub fn print(&self, out: &mut impl fmt::Write) -> fmt::Result {
        printer::print(&self.tree, self.tree.root(), out)
    }

    /// Run validation on a document parsed with [`ParseMode::ParseOnly`].
    ///
    /// Does nothing if the document is already validated or has errors: the
    /// validator relies on a structurally sound tree.
    pub fn validate(mut self) -> Self {
        if self.is_validated() {
            return self;
        }
        if self.has_errors() {
            debug!("skipping validation of a document with errors");
            return self;
        }

        let paths = {
            let mut view = SourceView::new(&self.text);
            if let Some(path) = &self.source_path {
                view = view.with_path(path.clone());
            }
            validation::validate(
                &self.tree,
                &view,
                &self.validate_options,
                &mut self.diagnostics,
            )
        };
        self.paths = Some(paths);
        self
    }

    /// Render every diagnostic as an ariadne report against the source text.
    pub fn render_diagnostics(&self) -> String {
        let filename = self.source_path.as_deref().unwrap_or("<input>");
        report::render(&self.diagnostics, filename, &self.text)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f)
    }
}

/// Parse and validate text.
pub fn parse(text: &str) -> Document {
    parse_with(SourceView::new(text), ParseOptions::default())
}

/// Parse and validate UTF-8 bytes. Invalid sequences are replaced and
/// reported.
pub fn parse_bytes(bytes: &[u8]) -> Document {
    parse_with(SourceView::from_utf8(bytes), ParseOptions::default())
}

/// Parse a source view with explicit options.
pub fn parse_with(source: SourceView<'_>, options: ParseOptions) -> Document {
    let mut diagnostics = DiagnosticBag::new();
    for error in source.decode_errors() {
        diagnostics.error(source.source_span(error.span), error.message);
    }

    let (tree, parse_diagnostics) = parse_source(&source).into_parts();
    diagnostics.extend(parse_diagnostics.iter().cloned());

    let document = Document {
        tree,
        diagnostics,
        source_path: source.path().cloned(),
        text: source.text().to_string(),
        paths: None,
        validate_options: options.validate,
    };
    match options.mode {
        ParseMode::ParseOnly => document,
        ParseMode::ParseAndValidate => document.validate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validates_by_default() {
        let doc = parse("a = 1\n");
        assert!(doc.is_validated());
        assert!(!doc.has_errors());
        assert_eq!(doc.to_string(), "a = 1\n");
    }

    #[test]
    fn test_parse_only_then_validate() {
        let doc = parse_with(
            SourceView::new("a = 1\na = 2\n"),
            ParseOptions::default().parse_only(),
        );
        assert!(!doc.is_validated());
        assert!(!doc.has_errors());

        let doc = doc.validate();
        assert!(doc.is_validated());
        assert!(doc.has_errors());
        assert_eq!(doc.diagnostics().len(), 1);

        // Validating again does not duplicate diagnostics.
        let doc = doc.validate();
        assert_eq!(doc.diagnostics().len(), 1);
    }

    #[test]
    fn test_validation_skipped_after_parse_errors() {
        let doc = parse("a = 1\na = 2\nb = \n");
        assert!(!doc.is_validated());
        let messages: Vec<&str> = doc.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["expecting a value"]);
    }

    #[test]
    fn test_diagnostic_text_format() {
        let doc = parse_with(
            SourceView::new("a = 1\na = 2\n").with_path("conf.toml"),
            ParseOptions::default(),
        );
        assert_eq!(doc.source_path(), Some("conf.toml"));
        assert_eq!(
            doc.diagnostics().to_string(),
            "conf.toml(2,1)-(2,2) : error : the key `a` is already defined\n"
        );
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let doc = parse_bytes(b"a = \"\xff\"\n");
        assert!(doc.has_errors());
        assert_eq!(
            doc.diagnostics().iter().next().unwrap().message,
            "invalid UTF-8 sequence"
        );
        assert_eq!(doc.to_string(), "a = \"\u{fffd}\"\n");
    }

    #[test]
    fn test_homogeneous_arrays_option() {
        let source = "a = [1, 2.0]\n";
        assert!(!parse(source).has_errors());
        let doc = parse_with(
            SourceView::new(source),
            ParseOptions::default().homogeneous_arrays(true),
        );
        assert!(doc.has_errors());
    }
}
