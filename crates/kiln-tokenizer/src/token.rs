//! Token types for the lexer.

use crate::{Span, TomlDateTime};

/// Which grammatical position the lexer is scanning for.
///
/// The same characters mean different things on each side of `=`:
/// `1.5` is two key segments in key position and a float in value position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexMode {
    /// Line start, table headers, keys.
    #[default]
    Key,
    /// After `=` and inside arrays.
    Value,
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural tokens
    /// `.`
    Dot,
    /// `=`
    Equal,
    /// `,`
    Comma,
    /// `[`
    OpenBracket,
    /// `[[`
    OpenBracketDouble,
    /// `]`
    CloseBracket,
    /// `]]`
    CloseBracketDouble,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,

    // Literals
    /// Decimal integer: `42`, `-1_000`
    Integer,
    /// Hexadecimal integer: `0xDEAD_BEEF`
    IntegerHexa,
    /// Octal integer: `0o755`
    IntegerOctal,
    /// Binary integer: `0b1010`
    IntegerBinary,
    /// Float: `3.14`, `6e-5`
    Float,
    /// Basic string: `"..."`
    String,
    /// Multi-line basic string: `"""..."""`
    StringMulti,
    /// Literal string: `'...'`
    StringLiteral,
    /// Multi-line literal string: `'''...'''`
    StringLiteralMulti,
    /// `1979-05-27T07:32:00Z`
    OffsetDateTimeByZ,
    /// `1979-05-27T07:32:00+01:00`
    OffsetDateTimeByNumber,
    /// `1979-05-27T07:32:00`
    LocalDateTime,
    /// `1979-05-27`
    LocalDate,
    /// `07:32:00`
    LocalTime,

    // Keywords
    /// `true`
    True,
    /// `false`
    False,
    /// `inf`
    Infinite,
    /// `+inf`
    PositiveInfinite,
    /// `-inf`
    NegativeInfinite,
    /// `nan`
    Nan,
    /// `+nan`
    PositiveNan,
    /// `-nan`
    NegativeNan,

    /// Bare key: `server-name`
    BasicKey,

    // Trivia
    /// Horizontal whitespace: spaces and tabs
    Whitespaces,
    /// `\n`, `\r\n` or a lone `\r`
    NewLine,
    /// `# ...`
    Comment,

    // Special tokens
    /// End of file
    Eof,
    /// Unrecognized input
    Invalid,
}

impl TokenKind {
    /// Whether this token is trivia (whitespace, newline or comment).
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespaces | TokenKind::NewLine | TokenKind::Comment
        )
    }

    /// Whether this token is punctuation.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Dot
                | TokenKind::Equal
                | TokenKind::Comma
                | TokenKind::OpenBracket
                | TokenKind::OpenBracketDouble
                | TokenKind::CloseBracket
                | TokenKind::CloseBracketDouble
                | TokenKind::OpenBrace
                | TokenKind::CloseBrace
        )
    }

    /// Whether this is one of the four integer kinds.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::IntegerHexa
                | TokenKind::IntegerOctal
                | TokenKind::IntegerBinary
        )
    }

    /// Whether this is a float literal or float keyword.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            TokenKind::Float
                | TokenKind::Infinite
                | TokenKind::PositiveInfinite
                | TokenKind::NegativeInfinite
                | TokenKind::Nan
                | TokenKind::PositiveNan
                | TokenKind::NegativeNan
        )
    }

    /// Whether this is one of the string kinds.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::StringMulti
                | TokenKind::StringLiteral
                | TokenKind::StringLiteralMulti
        )
    }

    /// Whether this is one of the datetime kinds.
    pub fn is_datetime(self) -> bool {
        matches!(
            self,
            TokenKind::OffsetDateTimeByZ
                | TokenKind::OffsetDateTimeByNumber
                | TokenKind::LocalDateTime
                | TokenKind::LocalDate
                | TokenKind::LocalTime
        )
    }

    /// The fixed spelling of punctuation and keywords.
    ///
    /// Tokens with a fixed spelling do not store their text.
    pub fn fixed_text(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Dot => ".",
            TokenKind::Equal => "=",
            TokenKind::Comma => ",",
            TokenKind::OpenBracket => "[",
            TokenKind::OpenBracketDouble => "[[",
            TokenKind::CloseBracket => "]",
            TokenKind::CloseBracketDouble => "]]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Infinite => "inf",
            TokenKind::PositiveInfinite => "+inf",
            TokenKind::NegativeInfinite => "-inf",
            TokenKind::Nan => "nan",
            TokenKind::PositiveNan => "+nan",
            TokenKind::NegativeNan => "-nan",
            TokenKind::Eof => "",
            _ => return None,
        })
    }

    /// Short description used in "expecting ..., found ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Dot => "`.`",
            TokenKind::Equal => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::OpenBracket => "`[`",
            TokenKind::OpenBracketDouble => "`[[`",
            TokenKind::CloseBracket => "`]`",
            TokenKind::CloseBracketDouble => "`]]`",
            TokenKind::OpenBrace => "`{`",
            TokenKind::CloseBrace => "`}`",
            TokenKind::Integer
            | TokenKind::IntegerHexa
            | TokenKind::IntegerOctal
            | TokenKind::IntegerBinary => "an integer",
            TokenKind::Float
            | TokenKind::Infinite
            | TokenKind::PositiveInfinite
            | TokenKind::NegativeInfinite
            | TokenKind::Nan
            | TokenKind::PositiveNan
            | TokenKind::NegativeNan => "a float",
            TokenKind::String
            | TokenKind::StringMulti
            | TokenKind::StringLiteral
            | TokenKind::StringLiteralMulti => "a string",
            TokenKind::OffsetDateTimeByZ
            | TokenKind::OffsetDateTimeByNumber
            | TokenKind::LocalDateTime
            | TokenKind::LocalDate
            | TokenKind::LocalTime => "a date-time",
            TokenKind::True | TokenKind::False => "a boolean",
            TokenKind::BasicKey => "a bare key",
            TokenKind::Whitespaces => "whitespace",
            TokenKind::NewLine => "a newline",
            TokenKind::Comment => "a comment",
            TokenKind::Eof => "end of file",
            TokenKind::Invalid => "invalid input",
        }
    }
}

/// A decoded literal carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    DateTime(TomlDateTime),
}

/// A token with its kind, span, and source text slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// The source text of this token.
    pub text: &'src str,
    /// Decoded literal value, for literal and keyword tokens.
    pub value: Option<TokenValue>,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self {
            kind,
            span,
            text,
            value: None,
        }
    }

    /// Attach a decoded value.
    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_text_only_for_punctuation_and_keywords() {
        assert_eq!(TokenKind::OpenBracketDouble.fixed_text(), Some("[["));
        assert_eq!(TokenKind::NegativeNan.fixed_text(), Some("-nan"));
        assert_eq!(TokenKind::Integer.fixed_text(), None);
        assert_eq!(TokenKind::BasicKey.fixed_text(), None);
    }

    #[test]
    fn classification() {
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Comma.is_trivia());
        assert!(TokenKind::IntegerHexa.is_integer());
        assert!(TokenKind::PositiveInfinite.is_float());
        assert!(TokenKind::LocalTime.is_datetime());
        assert!(TokenKind::StringLiteralMulti.is_string());
    }
}
