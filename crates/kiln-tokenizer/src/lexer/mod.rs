//! Dual-mode lexer.
//!
//! The parser chooses a [`LexMode`] for every significant token it asks for.
//! Trivia (whitespace, newlines, comments) and strings are scanned the same
//! way in both modes; everything else depends on the mode.

use tracing::trace;

use crate::{Diagnostic, LexMode, SourceView, Span, Token, TokenKind, TokenValue};

mod numbers;
mod strings;


/// A saved lexer position, used to re-lex a token in another mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: u32,
    diagnostics: usize,
}

/// A lexer that produces tokens from a [`SourceView`].
#[derive(Clone)]
pub struct Lexer<'src> {
    /// The source being tokenized, used to resolve diagnostic spans.
    view: &'src SourceView<'src>,
    /// The full decoded text.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    /// Problems found so far and not yet drained.
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source.
    pub fn new(view: &'src SourceView<'src>) -> Self {
        let source = view.text();
        Self {
            view,
            source,
            remaining: source,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Save the current position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            diagnostics: self.diagnostics.len(),
        }
    }

    /// Go back to a saved position, forgetting diagnostics raised since.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.remaining = &self.source[checkpoint.pos as usize..];
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Take the diagnostics collected so far.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Text consumed since `start`.
    #[inline]
    fn text_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.pos as usize]
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = self.text_from(start);
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Record an error.
    fn error(&mut self, span: Span, message: impl Into<String>) {
        let diagnostic = Diagnostic::error(self.view.source_span(span), message);
        self.diagnostics.push(diagnostic);
    }

    /// Lex a trivia token if one starts here.
    ///
    /// Trivia is the same in both modes.
    pub fn next_trivia(&mut self) -> Option<Token<'src>> {
        match self.peek()? {
            ' ' | '\t' | '\n' | '\r' | '#' => Some(self.next_token(LexMode::Key)),
            _ => None,
        }
    }

    /// Get the next token, scanning ambiguous characters according to `mode`.
    ///
    /// Once the end of input is reached every call returns `Eof`.
    pub fn next_token(&mut self, mode: LexMode) -> Token<'src> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        match c {
            ' ' | '\t' => self.lex_whitespace(),
            '\n' => {
                self.advance();
                self.token(TokenKind::NewLine, start)
            }
            '\r' => {
                self.advance();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                self.token(TokenKind::NewLine, start)
            }
            '#' => self.lex_comment(),
            '"' => self.lex_basic_string(),
            '\'' => self.lex_literal_string(),
            _ => match mode {
                LexMode::Key => self.next_key_token(c),
                LexMode::Value => self.next_value_token(c),
            },
        }
    }

    fn next_key_token(&mut self, c: char) -> Token<'src> {
        let start = self.pos;
        match c {
            '.' => self.punct(TokenKind::Dot, 1),
            '=' => self.punct(TokenKind::Equal, 1),
            ',' => self.punct(TokenKind::Comma, 1),
            '{' => self.punct(TokenKind::OpenBrace, 1),
            '}' => self.punct(TokenKind::CloseBrace, 1),
            '[' if self.starts_with("[[") => self.punct(TokenKind::OpenBracketDouble, 2),
            '[' => self.punct(TokenKind::OpenBracket, 1),
            ']' if self.starts_with("]]") => self.punct(TokenKind::CloseBracketDouble, 2),
            ']' => self.punct(TokenKind::CloseBracket, 1),
            _ if is_bare_key_char(c) => {
                while self.peek().is_some_and(is_bare_key_char) {
                    self.advance();
                }
                self.token(TokenKind::BasicKey, start)
            }
            _ => self.invalid_char(),
        }
    }

    fn next_value_token(&mut self, c: char) -> Token<'src> {
        match c {
            ',' => self.punct(TokenKind::Comma, 1),
            '[' => self.punct(TokenKind::OpenBracket, 1),
            ']' => self.punct(TokenKind::CloseBracket, 1),
            '{' => self.punct(TokenKind::OpenBrace, 1),
            '}' => self.punct(TokenKind::CloseBrace, 1),
            '=' => self.punct(TokenKind::Equal, 1),
            '.' => self.punct(TokenKind::Dot, 1),
            '+' | '-' if self.peek_nth(1).is_some_and(|c| c.is_ascii_alphabetic()) => {
                self.lex_keyword()
            }
            '0'..='9' | '+' | '-' | '_' => self.lex_number_or_datetime(),
            _ if c.is_ascii_alphabetic() => self.lex_keyword(),
            _ => self.invalid_char(),
        }
    }

    fn punct(&mut self, kind: TokenKind, len: usize) -> Token<'src> {
        let start = self.pos;
        self.advance_by(len);
        self.token(kind, start)
    }

    /// Lex horizontal whitespace (spaces and tabs).
    fn lex_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
        self.token(TokenKind::Whitespaces, start)
    }

    /// Lex a comment: `# ...` up to (not including) the end of line.
    fn lex_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            let at = self.pos;
            self.advance();
            if is_control(c) {
                self.error(
                    Span::new(at, self.pos),
                    "control characters are not allowed in comments",
                );
            }
        }
        self.token(TokenKind::Comment, start)
    }

    /// Lex `true`, `false`, `inf`, `nan` and their signed float forms.
    fn lex_keyword(&mut self) -> Token<'src> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance();
        }
        while self.peek().is_some_and(is_bare_key_char) {
            self.advance();
        }

        let (kind, value) = match self.text_from(start) {
            "true" => (TokenKind::True, TokenValue::Boolean(true)),
            "false" => (TokenKind::False, TokenValue::Boolean(false)),
            "inf" => (TokenKind::Infinite, TokenValue::Float(f64::INFINITY)),
            "+inf" => (TokenKind::PositiveInfinite, TokenValue::Float(f64::INFINITY)),
            "-inf" => (
                TokenKind::NegativeInfinite,
                TokenValue::Float(f64::NEG_INFINITY),
            ),
            "nan" => (TokenKind::Nan, TokenValue::Float(f64::NAN)),
            "+nan" => (TokenKind::PositiveNan, TokenValue::Float(f64::NAN)),
            "-nan" => (TokenKind::NegativeNan, TokenValue::Float(-f64::NAN)),
            other => {
                let message = format!("invalid value `{other}`");
                self.error(Span::new(start, self.pos), message);
                return self.token(TokenKind::Invalid, start);
            }
        };
        self.token(kind, start).with_value(value)
    }

    /// Consume one unrecognized character.
    fn invalid_char(&mut self) -> Token<'src> {
        let start = self.pos;
        if let Some(c) = self.advance() {
            let message = format!("unexpected character `{}`", c.escape_debug());
            self.error(Span::new(start, self.pos), message);
        }
        self.token(TokenKind::Invalid, start)
    }
}

/// Check if a character can appear in a bare key.
pub fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Control characters other than tab may not appear literally in strings
/// or comments.
fn is_control(c: char) -> bool {
    c != '\t' && (c < ' ' || c == '\u{7f}')
}
