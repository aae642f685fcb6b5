//! Line-Oriented Record Codec
//!
//! Records travel through byte streams and durable storage as UTF-8 text,
//! one record per line, fields separated by `;`:
//!
//! ```text
//! 1;Alice;3\n
//! 2;Bob;0\n
//! ```
//!
//! There is no escaping. A field containing `;` changes the field count and
//! the line is rejected on decode.

use std::fmt;

/// Separator between fields of an encoded line
pub const FIELD_SEPARATOR: char = ';';

/// Terminator appended to every encoded line
pub const LINE_TERMINATOR: char = '\n';

/// Why a line could not be decoded into a record
///
/// Never fatal: readers skip the offending line and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    /// Wrong number of `;`-separated fields
    FieldCount { expected: usize, actual: usize },
    /// A numeric field did not parse as an integer
    InvalidInteger { field: &'static str, value: String },
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRecord::FieldCount { expected, actual } => {
                write!(f, "expected {} fields, found {}", expected, actual)
            }
            MalformedRecord::InvalidInteger { field, value } => {
                write!(f, "field '{}' is not an integer: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for MalformedRecord {}

/// A value with a single-line text form
///
/// `to_line` must not emit the line terminator; `encode` adds it.
pub trait LineRecord: Sized {
    /// Text form of the record, without terminator
    fn to_line(&self) -> String;

    /// Parse one line (terminator already stripped)
    fn from_line(line: &str) -> Result<Self, MalformedRecord>;
}

/// Encode a record as its UTF-8 line, terminator included
pub fn encode<T: LineRecord>(record: &T) -> Vec<u8> {
    let mut line = record.to_line();
    line.push(LINE_TERMINATOR);
    line.into_bytes()
}

/// Decode a single line into a record
///
/// A trailing `\n` or `\r\n` is tolerated.
pub fn decode<T: LineRecord>(line: &str) -> Result<T, MalformedRecord> {
    let line = line.strip_suffix(LINE_TERMINATOR).unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    T::from_line(line)
}

/// Split a line into exactly `expected` fields
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, MalformedRecord> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != expected {
        return Err(MalformedRecord::FieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

/// Parse an integer field, ignoring surrounding ASCII whitespace
pub fn parse_int(field: &'static str, value: &str) -> Result<i32, MalformedRecord> {
    value
        .trim_matches(|c: char| c.is_ascii_whitespace())
        .parse()
        .map_err(|_| MalformedRecord::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_exact() {
        let fields = split_fields("1;a;2", 3).unwrap();
        assert_eq!(fields, vec!["1", "a", "2"]);
    }

    #[test]
    fn test_split_fields_count_mismatch() {
        assert_eq!(
            split_fields("1;a", 3),
            Err(MalformedRecord::FieldCount {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            split_fields("", 3),
            Err(MalformedRecord::FieldCount {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("id", "42"), Ok(42));
        assert_eq!(parse_int("id", " -7 "), Ok(-7));
        assert_eq!(parse_int("id", "+3"), Ok(3));
        assert!(parse_int("id", "4x").is_err());
        assert!(parse_int("id", "").is_err());
        assert!(parse_int("id", "99999999999").is_err());
        assert_eq!(parse_int("id", "\t12\r"), Ok(12));
        assert!(parse_int("id", "\u{a0}1").is_err());
        assert!(parse_int("id", "1\u{2003}").is_err());
    }

    #[test]
    fn test_malformed_display() {
        let err = MalformedRecord::InvalidInteger {
            field: "count",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "field 'count' is not an integer: \"abc\"");
    }
}
