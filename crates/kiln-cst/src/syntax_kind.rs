//! Syntax node kinds and trivia.

use kiln_tokenizer::{Token, TokenKind};

/// The kind of a syntax node.
///
/// `TOKEN` nodes are leaves holding one significant token; every other kind
/// groups child nodes.
///
/// The SCREAMING_CASE naming convention matches rust-analyzer style syntax
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    /// A leaf token (punctuation, literal text, end of line)
    TOKEN,

    /// Root document node
    DOCUMENT,
    /// `[table]` header and its key-values
    TABLE,
    /// `[[table-array]]` header and its key-values
    TABLE_ARRAY,
    /// `key = value`
    KEY_VALUE,
    /// A possibly dotted key
    KEY,
    /// `.segment` inside a dotted key
    DOTTED_KEY_ITEM,
    /// Unquoted key segment
    BARE_KEY,

    /// Basic or literal string, single or multi-line
    STRING,
    /// Integer in any radix
    INTEGER,
    /// Float, including `inf` and `nan`
    FLOAT,
    /// `true` or `false`
    BOOLEAN,
    /// One of the date-time shapes
    DATETIME,
    /// `[ ... ]`
    ARRAY,
    /// A value in an array and its trailing comma
    ARRAY_ITEM,
    /// `{ ... }`
    INLINE_TABLE,
    /// A key-value in an inline table and its trailing comma
    INLINE_TABLE_ITEM,
}

impl SyntaxKind {
    /// Whether this is a leaf token.
    pub fn is_token(self) -> bool {
        self == Self::TOKEN
    }

    /// Whether this is a value node kind.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            Self::STRING
                | Self::INTEGER
                | Self::FLOAT
                | Self::BOOLEAN
                | Self::DATETIME
                | Self::ARRAY
                | Self::INLINE_TABLE
        )
    }

    /// The scalar node kind built around a token of `kind`, if any.
    pub fn scalar_for(kind: TokenKind) -> Option<Self> {
        if kind.is_string() {
            Some(Self::STRING)
        } else if kind.is_integer() {
            Some(Self::INTEGER)
        } else if kind.is_float() {
            Some(Self::FLOAT)
        } else if kind.is_datetime() {
            Some(Self::DATETIME)
        } else if matches!(kind, TokenKind::True | TokenKind::False) {
            Some(Self::BOOLEAN)
        } else {
            None
        }
    }
}

/// What a piece of trivia is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    /// Spaces and tabs.
    Whitespace,
    /// A line ending.
    Newline,
    /// `# ...`
    Comment,
    /// Text the parser could not use, kept so the source prints back intact.
    Skipped,
}

/// Non-semantic text attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxTrivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl SyntaxTrivia {
    /// Create trivia from its parts.
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Trivia for a lexed token; non-trivia tokens become `Skipped`.
    pub fn from_token(token: &Token<'_>) -> Self {
        let kind = match token.kind {
            TokenKind::Whitespaces => TriviaKind::Whitespace,
            TokenKind::NewLine => TriviaKind::Newline,
            TokenKind::Comment => TriviaKind::Comment,
            _ => TriviaKind::Skipped,
        };
        Self::new(kind, token.text)
    }
}
