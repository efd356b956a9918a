//! Source handling, diagnostics and the dual-mode lexer for kiln.

mod span;
pub use span::Span;

mod source;
pub use source::{DecodeError, LineIndex, SourceSpan, SourceView, TextPosition};

mod diagnostic;
pub use diagnostic::{Diagnostic, DiagnosticBag, Severity};

mod datetime;
pub use datetime::{DateTimeError, DateTimeKind, TomlDate, TomlDateTime, TomlOffset, TomlTime};

mod token;
pub use token::{LexMode, Token, TokenKind, TokenValue};

mod lexer;
pub use lexer::{Checkpoint, Lexer, is_bare_key_char};
