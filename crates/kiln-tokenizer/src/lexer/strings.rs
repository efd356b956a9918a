//! Basic and literal strings, single-line and multi-line.

use super::{Lexer, is_control};
use crate::{Span, Token, TokenKind, TokenValue};

impl<'src> Lexer<'src> {
    /// Lex `"..."` or `"""..."""`.
    pub(super) fn lex_basic_string(&mut self) -> Token<'src> {
        if self.starts_with("\"\"\"") {
            return self.lex_multiline_string('"');
        }

        let start = self.pos;
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(Span::new(start, self.pos), "unterminated string");
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n' | '\r') => {
                    self.error(
                        Span::new(start, self.pos),
                        "newlines are not allowed in single-line strings",
                    );
                    break;
                }
                Some('\\') => self.lex_escape(&mut value, false),
                Some(c) => self.push_string_char(&mut value, c),
            }
        }
        self.token(TokenKind::String, start)
            .with_value(TokenValue::String(value))
    }

    /// Lex `'...'` or `'''...'''`.
    pub(super) fn lex_literal_string(&mut self) -> Token<'src> {
        if self.starts_with("'''") {
            return self.lex_multiline_string('\'');
        }

        let start = self.pos;
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(Span::new(start, self.pos), "unterminated string");
                    break;
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\n' | '\r') => {
                    self.error(
                        Span::new(start, self.pos),
                        "newlines are not allowed in single-line strings",
                    );
                    break;
                }
                Some(c) => self.push_string_char(&mut value, c),
            }
        }
        self.token(TokenKind::StringLiteral, start)
            .with_value(TokenValue::String(value))
    }

    /// Lex a triple-quoted string delimited by `quote`.
    fn lex_multiline_string(&mut self, quote: char) -> Token<'src> {
        let start = self.pos;
        let (kind, escapes) = if quote == '"' {
            (TokenKind::StringMulti, true)
        } else {
            (TokenKind::StringLiteralMulti, false)
        };
        self.advance_by(3);

        // A newline right after the opening delimiter is not content.
        if self.starts_with("\r\n") {
            self.advance_by(2);
        } else if matches!(self.peek(), Some('\n' | '\r')) {
            self.advance();
        }

        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(
                        Span::new(start, self.pos),
                        "unterminated multi-line string",
                    );
                    break;
                }
                Some(c) if c == quote => {
                    let run = self.remaining.chars().take_while(|&c| c == quote).count();
                    if run < 3 {
                        self.advance_by(run);
                        value.extend(std::iter::repeat_n(quote, run));
                        continue;
                    }
                    // Up to two quotes before the closing delimiter are content.
                    let run_start = self.pos;
                    self.advance_by(run);
                    value.extend(std::iter::repeat_n(quote, run - 3));
                    if run > 5 {
                        self.error(
                            Span::new(run_start, self.pos),
                            "too many quotes at the end of a multi-line string",
                        );
                    }
                    break;
                }
                Some('\\') if escapes => self.lex_escape(&mut value, true),
                Some('\n') => {
                    self.advance();
                    value.push('\n');
                }
                Some('\r') => {
                    let at = self.pos;
                    self.advance();
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    value.push_str(self.text_from(at));
                }
                Some(c) => self.push_string_char(&mut value, c),
            }
        }
        self.token(kind, start).with_value(TokenValue::String(value))
    }

    /// Consume one literal character of string content.
    fn push_string_char(&mut self, value: &mut String, c: char) {
        let at = self.pos;
        self.advance();
        if is_control(c) {
            self.error(
                Span::new(at, self.pos),
                "control characters must be escaped in strings",
            );
        }
        value.push(c);
    }

    /// Decode one backslash escape. The cursor is on the `\`.
    fn lex_escape(&mut self, value: &mut String, multiline: bool) {
        let start = self.pos;
        self.advance();
        let Some(c) = self.peek() else {
            return;
        };

        let decoded = match c {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            '"' => '"',
            '\\' => '\\',
            'u' => return self.lex_unicode_escape(value, start, 4),
            'U' => return self.lex_unicode_escape(value, start, 8),
            ' ' | '\t' | '\n' | '\r' if multiline => return self.lex_line_continuation(start),
            '\n' | '\r' => {
                self.error(Span::new(start, self.pos), "invalid escape sequence");
                return;
            }
            _ => {
                self.advance();
                let message = format!("invalid escape sequence `\\{}`", c.escape_debug());
                self.error(Span::new(start, self.pos), message);
                return;
            }
        };
        self.advance();
        value.push(decoded);
    }

    /// `\uXXXX` or `\UXXXXXXXX`. The cursor is on the `u`/`U`.
    fn lex_unicode_escape(&mut self, value: &mut String, start: u32, len: usize) {
        self.advance();
        let digits_start = self.pos as usize;
        let mut count = 0;
        while count < len && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
            count += 1;
        }

        if count < len {
            self.error(
                Span::new(start, self.pos),
                format!("expecting {len} hexadecimal digits in unicode escape"),
            );
            return;
        }

        let digits = &self.source[digits_start..self.pos as usize];
        match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
            Some(c) => value.push(c),
            None => self.error(
                Span::new(start, self.pos),
                "unicode escape is not a valid scalar value",
            ),
        }
    }

    /// A `\` at the end of a line swallows the newline and all whitespace
    /// that follows it. The cursor is just past the `\`.
    fn lex_line_continuation(&mut self, start: u32) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
        if !matches!(self.peek(), Some('\n' | '\r')) {
            self.error(
                Span::new(start, self.pos),
                "a line-ending backslash must be followed by a newline",
            );
            return;
        }
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
    }
}
