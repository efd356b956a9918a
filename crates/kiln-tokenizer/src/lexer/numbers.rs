//! Integers, floats and date-time literals.

use super::Lexer;
use crate::{DateTimeKind, Span, Token, TokenKind, TokenValue, TomlDateTime};

impl<'src> Lexer<'src> {
    pub(super) fn lex_number_or_datetime(&mut self) -> Token<'src> {
        if self.looks_like_datetime() {
            self.lex_datetime()
        } else {
            self.lex_number()
        }
    }

    /// `YYYY-` starts a date, `HH:` starts a time.
    fn looks_like_datetime(&self) -> bool {
        let bytes = self.remaining.as_bytes();
        let digits = |n: usize| bytes.len() > n && bytes[..n].iter().all(u8::is_ascii_digit);
        (digits(4) && bytes[4] == b'-') || (digits(2) && bytes[2] == b':')
    }

    fn lex_datetime(&mut self) -> Token<'src> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let is_datetime_char = c.is_ascii_digit()
                || matches!(c, '-' | ':' | '.' | '+' | 'T' | 't' | 'Z' | 'z');
            // `1979-05-27 07:32:00` uses a space as the separator
            let is_space_separator = c == ' '
                && self.pos - start == 10
                && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
                && self.peek_nth(2).is_some_and(|c| c.is_ascii_digit())
                && self.peek_nth(3) == Some(':');
            if is_datetime_char || is_space_separator {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.text_from(start);
        match TomlDateTime::parse(text) {
            Ok(datetime) => {
                let kind = match datetime.kind {
                    DateTimeKind::OffsetDateTimeByZ => TokenKind::OffsetDateTimeByZ,
                    DateTimeKind::OffsetDateTimeByNumber => TokenKind::OffsetDateTimeByNumber,
                    DateTimeKind::LocalDateTime => TokenKind::LocalDateTime,
                    DateTimeKind::LocalDate => TokenKind::LocalDate,
                    DateTimeKind::LocalTime => TokenKind::LocalTime,
                };
                self.token(kind, start)
                    .with_value(TokenValue::DateTime(datetime))
            }
            Err(err) => {
                self.error(Span::new(start, self.pos), err.to_string());
                self.token(TokenKind::Invalid, start)
            }
        }
    }

    fn lex_number(&mut self) -> Token<'src> {
        let start = self.pos;
        let sign = match self.peek() {
            Some(c @ ('+' | '-')) => {
                self.advance();
                Some(c)
            }
            _ => None,
        };

        if self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'o' | 'b')) {
            return self.lex_radix_integer(start, sign.is_some());
        }

        // Digits with separators removed, ready for `str::parse`.
        let mut cleaned = String::new();
        if sign == Some('-') {
            cleaned.push('-');
        }

        let int_start = cleaned.len();
        if self.scan_digits(&mut cleaned, 10) == 0 {
            self.error(Span::new(start, self.pos), "expecting a number");
            return self.token(TokenKind::Invalid, start);
        }
        let int_digits = &cleaned[int_start..];
        if int_digits.len() > 1 && int_digits.starts_with('0') {
            self.error(
                Span::new(start, self.pos),
                "leading zeros are not allowed in numbers",
            );
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.error(
                    Span::new(start, self.pos),
                    "expecting a digit after the decimal point",
                );
                return self.token(TokenKind::Invalid, start);
            }
            cleaned.push('.');
            self.scan_digits(&mut cleaned, 10);
            is_float = true;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            cleaned.push('e');
            if let Some(c @ ('+' | '-')) = self.peek() {
                self.advance();
                cleaned.push(c);
            }
            if self.scan_digits(&mut cleaned, 10) == 0 {
                self.error(
                    Span::new(start, self.pos),
                    "expecting a digit in the exponent",
                );
                return self.token(TokenKind::Invalid, start);
            }
            is_float = true;
        }

        if is_float {
            return match cleaned.parse::<f64>() {
                Ok(value) => self
                    .token(TokenKind::Float, start)
                    .with_value(TokenValue::Float(value)),
                Err(_) => {
                    self.error(Span::new(start, self.pos), "invalid float");
                    self.token(TokenKind::Invalid, start)
                }
            };
        }

        match cleaned.parse::<i64>() {
            Ok(value) => self
                .token(TokenKind::Integer, start)
                .with_value(TokenValue::Integer(value)),
            Err(_) => {
                self.error(
                    Span::new(start, self.pos),
                    "integer does not fit in 64 bits",
                );
                self.token(TokenKind::Invalid, start)
            }
        }
    }

    /// `0x`, `0o` and `0b` integers. The cursor is on the `0`.
    fn lex_radix_integer(&mut self, start: u32, signed: bool) -> Token<'src> {
        self.advance();
        let (radix, kind, name, prefix) = match self.advance() {
            Some('x') => (16, TokenKind::IntegerHexa, "hexadecimal", "0x"),
            Some('o') => (8, TokenKind::IntegerOctal, "octal", "0o"),
            _ => (2, TokenKind::IntegerBinary, "binary", "0b"),
        };
        if signed {
            self.error(
                Span::new(start, self.pos),
                format!("a sign is not allowed on {name} integers"),
            );
        }

        let mut cleaned = String::new();
        let count = self.scan_digits(&mut cleaned, radix);

        // Trailing alphanumerics are digits of the wrong base (`0b102`, `0o8`).
        if self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                self.advance();
            }
            self.error(
                Span::new(start, self.pos),
                format!("invalid digit in {name} integer"),
            );
            return self.token(TokenKind::Invalid, start);
        }

        if count == 0 {
            self.error(
                Span::new(start, self.pos),
                format!("expecting digits after `{prefix}`"),
            );
            return self.token(TokenKind::Invalid, start);
        }

        match u64::from_str_radix(&cleaned, radix) {
            // Values above i64::MAX keep their bit pattern.
            Ok(value) => self
                .token(kind, start)
                .with_value(TokenValue::Integer(value as i64)),
            Err(_) => {
                self.error(
                    Span::new(start, self.pos),
                    "integer does not fit in 64 bits",
                );
                self.token(TokenKind::Invalid, start)
            }
        }
    }

    /// Consume digits of `radix` and `_` separators, pushing the digits to
    /// `cleaned`. Returns the number of digits.
    ///
    /// A separator without a digit on both sides is reported but scanning
    /// continues.
    fn scan_digits(&mut self, cleaned: &mut String, radix: u32) -> usize {
        let mut count = 0;
        let mut after_digit = false;
        loop {
            match self.peek() {
                Some(c) if c.is_digit(radix) => {
                    self.advance();
                    cleaned.push(c);
                    count += 1;
                    after_digit = true;
                }
                Some('_') => {
                    let at = self.pos;
                    self.advance();
                    let before_digit = self.peek().is_some_and(|c| c.is_digit(radix));
                    if !after_digit || !before_digit {
                        self.error(
                            Span::new(at, self.pos),
                            "underscores in numbers must be surrounded by digits",
                        );
                    }
                    after_digit = false;
                }
                _ => break,
            }
        }
        count
    }
}
