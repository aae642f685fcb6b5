//! Singer record
//!
//! The domain value streamed through the pipeline. Encoded as
//! `<id>;<name>;<count>` where `count` is the number of songs.

use crate::streaming::codec::{parse_int, split_fields, LineRecord, MalformedRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A performer and how many songs they have
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Singer {
    pub id: i32,
    pub name: String,
    /// Number of songs
    pub count: i32,
}

impl Singer {
    pub fn new(id: i32, name: impl Into<String>, count: i32) -> Self {
        Singer {
            id,
            name: name.into(),
            count,
        }
    }
}

impl fmt::Display for Singer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.id, self.name, self.count)
    }
}

impl LineRecord for Singer {
    fn to_line(&self) -> String {
        self.to_string()
    }

    fn from_line(line: &str) -> Result<Self, MalformedRecord> {
        let fields = split_fields(line, 3)?;
        Ok(Singer {
            id: parse_int("id", fields[0])?,
            name: fields[1].to_string(),
            count: parse_int("count", fields[2])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::codec::{decode, encode};

    #[test]
    fn test_encode_format() {
        let singer = Singer::new(1, "Alice", 3);
        assert_eq!(encode(&singer), b"1;Alice;3\n");
    }

    #[test]
    fn test_roundtrip() {
        for singer in [
            Singer::new(1, "Alice", 3),
            Singer::new(0, "", 0),
            Singer::new(-5, "Łukasz Ø", i32::MAX),
            Singer::new(i32::MIN, "with spaces  ", -1),
        ] {
            let bytes = encode(&singer);
            let line = std::str::from_utf8(&bytes).unwrap();
            assert_eq!(decode::<Singer>(line), Ok(singer));
        }
    }

    #[test]
    fn test_decode_strips_crlf() {
        let singer: Singer = decode("2;Bob;0\r\n").unwrap();
        assert_eq!(singer, Singer::new(2, "Bob", 0));
    }

    #[test]
    fn test_decode_too_few_fields() {
        assert_eq!(
            decode::<Singer>("2;Bob"),
            Err(MalformedRecord::FieldCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_decode_name_with_separator_is_rejected() {
        // No escaping: the separator inside a name adds a field
        let singer = Singer::new(4, "AC;DC", 12);
        let bytes = encode(&singer);
        let line = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(
            decode::<Singer>(line),
            Err(MalformedRecord::FieldCount {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn test_decode_non_integer_fields() {
        assert!(matches!(
            decode::<Singer>("x;Bob;1"),
            Err(MalformedRecord::InvalidInteger { field: "id", .. })
        ));
        assert!(matches!(
            decode::<Singer>("1;Bob;many"),
            Err(MalformedRecord::InvalidInteger { field: "count", .. })
        ));
    }

    #[test]
    fn test_decode_tolerates_padded_integers() {
        let singer: Singer = decode(" 7 ;Cara; 5").unwrap();
        assert_eq!(singer, Singer::new(7, "Cara", 5));
    }

    #[test]
    fn test_decode_rejects_unicode_padding() {
        assert_eq!(
            decode::<Singer>("\u{a0}1;A;3"),
            Err(MalformedRecord::InvalidInteger {
                field: "id",
                value: "\u{a0}1".to_string()
            })
        );
    }
}
