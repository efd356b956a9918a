//! Source text handling: decoding, paths, and line/column resolution.

use std::borrow::Cow;
use std::sync::Arc;

use crate::Span;

/// A zero-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    /// Byte offset.
    pub offset: u32,
    /// Zero-based line.
    pub line: u32,
    /// Zero-based column, counted in characters.
    pub column: u32,
}

/// A span resolved against a source: path plus start/end positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    /// Path of the source, if one was given.
    pub path: Option<Arc<str>>,
    /// Start position (inclusive).
    pub start: TextPosition,
    /// End position (exclusive).
    pub end: TextPosition,
}

impl SourceSpan {
    /// The byte range covered by this span.
    pub fn span(&self) -> Span {
        Span::new(self.start.offset, self.end.offset)
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({},{})-({},{})",
            self.path.as_deref().unwrap_or(""),
            self.start.line + 1,
            self.start.column + 1,
            self.end.line + 1,
            self.end.column + 1
        )
    }
}

/// Maps byte offsets to lines.
///
/// `\n`, `\r\n` and a lone `\r` each terminate a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build the index for a text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i as u32 + 1),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 1;
                    line_starts.push(i as u32 + 1);
                }
                b'\r' => line_starts.push(i as u32 + 1),
                _ => {}
            }
            i += 1;
        }
        Self { line_starts }
    }

    /// Number of lines (an empty text has one line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based line containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line as u32,
            Err(next) => next as u32 - 1,
        }
    }

    /// Resolve `offset` to a position in `text`.
    ///
    /// Offsets past the end are clamped; offsets inside a multi-byte
    /// character resolve to that character's column.
    pub fn position(&self, text: &str, offset: u32) -> TextPosition {
        let offset = offset.min(text.len() as u32);
        let line = self.line_of(offset);
        let line_start = self.line_starts[line as usize] as usize;
        let column = text[line_start..]
            .char_indices()
            .take_while(|(i, _)| line_start + i < offset as usize)
            .count() as u32;
        TextPosition {
            offset,
            line,
            column,
        }
    }
}

/// A decoding problem found while building a [`SourceView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    /// Where the replacement character landed in the decoded text.
    pub span: Span,
    /// What was wrong with the input.
    pub message: &'static str,
}

/// Read-only view over the text being parsed.
///
/// Accepts already-decoded text, UTF-8 bytes, or UTF-16 code units. Invalid
/// input is replaced with U+FFFD and recorded in [`SourceView::decode_errors`].
#[derive(Debug, Clone)]
pub struct SourceView<'src> {
    text: Cow<'src, str>,
    path: Option<Arc<str>>,
    line_index: LineIndex,
    decode_errors: Vec<DecodeError>,
}

impl<'src> SourceView<'src> {
    /// View over decoded text.
    pub fn new(text: &'src str) -> Self {
        Self::from_cow(Cow::Borrowed(text), Vec::new())
    }

    /// View over UTF-8 bytes.
    pub fn from_utf8(bytes: &'src [u8]) -> Self {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Self::new(text);
        }

        let mut text = String::with_capacity(bytes.len());
        let mut errors = Vec::new();
        for chunk in bytes.utf8_chunks() {
            text.push_str(chunk.valid());
            if !chunk.invalid().is_empty() {
                let start = text.len() as u32;
                text.push(char::REPLACEMENT_CHARACTER);
                errors.push(DecodeError {
                    span: Span::new(start, text.len() as u32),
                    message: "invalid UTF-8 sequence",
                });
            }
        }
        Self::from_cow(Cow::Owned(text), errors)
    }

    /// View over UTF-16 code units.
    pub fn from_utf16(units: &[u16]) -> SourceView<'static> {
        let mut text = String::with_capacity(units.len());
        let mut errors = Vec::new();
        for decoded in char::decode_utf16(units.iter().copied()) {
            match decoded {
                Ok(c) => text.push(c),
                Err(_) => {
                    let start = text.len() as u32;
                    text.push(char::REPLACEMENT_CHARACTER);
                    errors.push(DecodeError {
                        span: Span::new(start, text.len() as u32),
                        message: "unpaired UTF-16 surrogate",
                    });
                }
            }
        }
        SourceView::from_cow(Cow::Owned(text), errors)
    }

    fn from_cow(text: Cow<'src, str>, decode_errors: Vec<DecodeError>) -> Self {
        let line_index = LineIndex::new(&text);
        Self {
            text,
            path: None,
            line_index,
            decode_errors,
        }
    }

    /// Attach a path used in diagnostics.
    pub fn with_path(mut self, path: impl Into<Arc<str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The decoded text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The diagnostic path, if any.
    #[inline]
    pub fn path(&self) -> Option<&Arc<str>> {
        self.path.as_ref()
    }

    /// Characters of the decoded text with their byte offsets.
    pub fn char_indices(&self) -> std::str::CharIndices<'_> {
        self.text.char_indices()
    }

    /// Problems found while decoding the input.
    pub fn decode_errors(&self) -> &[DecodeError] {
        &self.decode_errors
    }

    /// The line index for this text.
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Resolve a byte offset.
    pub fn position(&self, offset: u32) -> TextPosition {
        self.line_index.position(&self.text, offset)
    }

    /// Resolve a byte span.
    pub fn source_span(&self, span: Span) -> SourceSpan {
        SourceSpan {
            path: self.path.clone(),
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}
