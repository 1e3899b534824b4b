//! Opaque list cursors: base64 of `cursor:<offset>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const PREFIX: &str = "cursor:";

pub fn encode_cursor(offset: u64) -> String {
    STANDARD.encode(format!("{PREFIX}{offset}"))
}

/// Offset encoded in `cursor`, or `-1` when it is malformed.
pub fn decode_cursor(cursor: &str) -> i64 {
    STANDARD
        .decode(cursor.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| text.strip_prefix(PREFIX).map(str::to_string))
        .and_then(|offset| offset.parse::<i64>().ok())
        .filter(|offset| *offset >= 0)
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_cursor() {
        assert_eq!(encode_cursor(42), "Y3Vyc29yOjQy");
        assert_eq!(decode_cursor("Y3Vyc29yOjQy"), 42);
    }

    #[test]
    fn test_roundtrip() {
        for offset in [0, 1, 9, 10, 999, 1 << 40] {
            assert_eq!(decode_cursor(&encode_cursor(offset)), offset as i64);
        }
    }

    #[test]
    fn test_malformed() {
        assert_eq!(decode_cursor("not-base64"), -1);
        assert_eq!(decode_cursor(""), -1);
        // "offset:4" and "cursor:x"
        assert_eq!(decode_cursor("b2Zmc2V0OjQ="), -1);
        assert_eq!(decode_cursor("Y3Vyc29yOng="), -1);
    }
}
