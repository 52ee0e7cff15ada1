//! Fixed-width string fields.

use std::borrow::Cow;

/// Length of the string stored in a NUL-padded field.
///
/// This is the index of the first NUL byte, or the full field width when the
/// field has no terminator.
#[inline]
pub fn fixed_str_len(field: &[u8]) -> usize {
    memchr::memchr(0, field).unwrap_or(field.len())
}

/// Decode a NUL-padded fixed-width string field.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn fixed_str(field: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(&field[..fixed_str_len(field)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_first_nul() {
        let mut field = [0u8; 32];
        field[..6].copy_from_slice(b"hi.txt");
        field[7] = b'x';

        assert_eq!(fixed_str_len(&field), 6);
        assert_eq!(fixed_str(&field), "hi.txt");
    }

    #[test]
    fn test_unterminated_uses_full_width() {
        let field = [b'a'; 32];

        assert_eq!(fixed_str_len(&field), 32);
        assert_eq!(fixed_str(&field).len(), 32);
    }

    #[test]
    fn test_empty_field() {
        assert_eq!(fixed_str(&[0u8; 32]), "");
    }
}
