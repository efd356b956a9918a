//! Date and time literal values.

/// Which of the datetime shapes a literal has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    /// `1979-05-27T07:32:00Z`
    OffsetDateTimeByZ,
    /// `1979-05-27T00:32:00-07:00`
    OffsetDateTimeByNumber,
    /// `1979-05-27T07:32:00`
    LocalDateTime,
    /// `1979-05-27`
    LocalDate,
    /// `07:32:00`
    LocalTime,
}

/// A calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TomlDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TomlTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    /// Number of fractional digits written in the source (at most 9 kept).
    pub precision: u8,
}

/// A UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TomlOffset {
    /// `Z` or `z`.
    Z,
    /// `+HH:MM` / `-HH:MM`, in minutes east of UTC.
    Minutes(i16),
}

/// A decoded datetime literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TomlDateTime {
    pub kind: DateTimeKind,
    pub date: Option<TomlDate>,
    pub time: Option<TomlTime>,
    pub offset: Option<TomlOffset>,
}

/// Why a datetime literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    /// The text does not have a datetime shape.
    Malformed,
    /// A component is out of its valid range.
    OutOfRange(&'static str),
}

impl std::fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateTimeError::Malformed => write!(f, "invalid date-time literal"),
            DateTimeError::OutOfRange(what) => write!(f, "invalid date-time: {what} out of range"),
        }
    }
}

impl std::error::Error for DateTimeError {}

impl TomlDateTime {
    /// Parse a complete datetime literal.
    ///
    /// The date/time separator may be `T`, `t` or a single space. Seconds are
    /// required; fractional digits beyond nanoseconds are truncated.
    pub fn parse(text: &str) -> Result<Self, DateTimeError> {
        let mut cursor = Cursor {
            bytes: text.as_bytes(),
            pos: 0,
        };

        let is_time_only = text.as_bytes().get(2) == Some(&b':');
        if is_time_only {
            let time = cursor.time()?;
            cursor.finish()?;
            return Ok(Self {
                kind: DateTimeKind::LocalTime,
                date: None,
                time: Some(time),
                offset: None,
            });
        }

        let date = cursor.date()?;
        if cursor.at_end() {
            return Ok(Self {
                kind: DateTimeKind::LocalDate,
                date: Some(date),
                time: None,
                offset: None,
            });
        }

        match cursor.bump() {
            Some(b'T' | b't' | b' ') => {}
            _ => return Err(DateTimeError::Malformed),
        }
        let time = cursor.time()?;

        let (kind, offset) = match cursor.peek() {
            None => (DateTimeKind::LocalDateTime, None),
            Some(b'Z' | b'z') => {
                cursor.bump();
                (DateTimeKind::OffsetDateTimeByZ, Some(TomlOffset::Z))
            }
            Some(sign @ (b'+' | b'-')) => {
                cursor.bump();
                let hour = cursor.digits(2)?;
                cursor.expect(b':')?;
                let minute = cursor.digits(2)?;
                if hour > 23 {
                    return Err(DateTimeError::OutOfRange("offset hour"));
                }
                if minute > 59 {
                    return Err(DateTimeError::OutOfRange("offset minute"));
                }
                let minutes = (hour * 60 + minute) as i16;
                let minutes = if sign == b'-' { -minutes } else { minutes };
                (
                    DateTimeKind::OffsetDateTimeByNumber,
                    Some(TomlOffset::Minutes(minutes)),
                )
            }
            Some(_) => return Err(DateTimeError::Malformed),
        };
        cursor.finish()?;

        Ok(Self {
            kind,
            date: Some(date),
            time: Some(time),
            offset,
        })
    }
}

impl std::fmt::Display for TomlDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl std::fmt::Display for TomlTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.precision > 0 {
            let digits = format!("{:09}", self.nanosecond);
            write!(f, ".{}", &digits[..self.precision as usize])?;
        }
        Ok(())
    }
}

impl std::fmt::Display for TomlOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TomlOffset::Z => write!(f, "Z"),
            TomlOffset::Minutes(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

impl std::fmt::Display for TomlDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(date) = &self.date {
            write!(f, "{date}")?;
            if self.time.is_some() {
                write!(f, "T")?;
            }
        }
        if let Some(time) = &self.time {
            write!(f, "{time}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn finish(&self) -> Result<(), DateTimeError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(DateTimeError::Malformed)
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), DateTimeError> {
        match self.bump() {
            Some(found) if found == b => Ok(()),
            _ => Err(DateTimeError::Malformed),
        }
    }

    fn digits(&mut self, count: usize) -> Result<u32, DateTimeError> {
        let mut value = 0u32;
        for _ in 0..count {
            match self.bump() {
                Some(b @ b'0'..=b'9') => value = value * 10 + (b - b'0') as u32,
                _ => return Err(DateTimeError::Malformed),
            }
        }
        Ok(value)
    }

    fn date(&mut self) -> Result<TomlDate, DateTimeError> {
        let year = self.digits(4)?;
        self.expect(b'-')?;
        let month = self.digits(2)?;
        self.expect(b'-')?;
        let day = self.digits(2)?;

        if !(1..=12).contains(&month) {
            return Err(DateTimeError::OutOfRange("month"));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateTimeError::OutOfRange("day"));
        }
        Ok(TomlDate {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        })
    }

    fn time(&mut self) -> Result<TomlTime, DateTimeError> {
        let hour = self.digits(2)?;
        self.expect(b':')?;
        let minute = self.digits(2)?;
        self.expect(b':')?;
        let second = self.digits(2)?;

        let mut nanosecond = 0u32;
        let mut precision = 0u8;
        if self.peek() == Some(b'.') {
            self.bump();
            let mut seen = 0usize;
            while let Some(b @ b'0'..=b'9') = self.peek() {
                self.bump();
                if seen < 9 {
                    nanosecond = nanosecond * 10 + (b - b'0') as u32;
                    precision += 1;
                }
                seen += 1;
            }
            if seen == 0 {
                return Err(DateTimeError::Malformed);
            }
            for _ in precision..9 {
                nanosecond *= 10;
            }
        }

        if hour > 23 {
            return Err(DateTimeError::OutOfRange("hour"));
        }
        if minute > 59 {
            return Err(DateTimeError::OutOfRange("minute"));
        }
        if second > 60 {
            return Err(DateTimeError::OutOfRange("second"));
        }
        Ok(TomlTime {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            nanosecond,
            precision,
        })
    }
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap { 29 } else { 28 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_by_z() {
        let dt = TomlDateTime::parse("1979-05-27T07:32:00Z").unwrap();
        assert_eq!(dt.kind, DateTimeKind::OffsetDateTimeByZ);
        assert_eq!(dt.offset, Some(TomlOffset::Z));
        assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
    }

    #[test]
    fn offset_by_number_with_fraction() {
        let dt = TomlDateTime::parse("1979-05-27 00:32:00.999999-07:00").unwrap();
        assert_eq!(dt.kind, DateTimeKind::OffsetDateTimeByNumber);
        assert_eq!(dt.offset, Some(TomlOffset::Minutes(-420)));
        let time = dt.time.unwrap();
        assert_eq!(time.nanosecond, 999_999_000);
        assert_eq!(dt.to_string(), "1979-05-27T00:32:00.999999-07:00");
    }

    #[test]
    fn local_shapes() {
        assert_eq!(
            TomlDateTime::parse("1979-05-27t07:32:00").unwrap().kind,
            DateTimeKind::LocalDateTime
        );
        assert_eq!(
            TomlDateTime::parse("1979-05-27").unwrap().kind,
            DateTimeKind::LocalDate
        );
        assert_eq!(
            TomlDateTime::parse("07:32:00").unwrap().kind,
            DateTimeKind::LocalTime
        );
    }

    #[test]
    fn excess_fraction_digits_are_truncated() {
        let dt = TomlDateTime::parse("00:00:00.1234567891").unwrap();
        let time = dt.time.unwrap();
        assert_eq!(time.nanosecond, 123_456_789);
        assert_eq!(time.precision, 9);
    }

    #[test]
    fn ranges_are_checked() {
        assert_eq!(
            TomlDateTime::parse("2021-02-29"),
            Err(DateTimeError::OutOfRange("day"))
        );
        assert!(TomlDateTime::parse("2020-02-29").is_ok());
        assert_eq!(
            TomlDateTime::parse("2021-13-01"),
            Err(DateTimeError::OutOfRange("month"))
        );
        assert_eq!(
            TomlDateTime::parse("24:00:00"),
            Err(DateTimeError::OutOfRange("hour"))
        );
        assert_eq!(
            TomlDateTime::parse("1979-05-27T07:32"),
            Err(DateTimeError::Malformed)
        );
    }
}
