//! Offsets reported by range boundaries are UTF-16 code units, while node text
//! is stored as UTF-8. These helpers translate between the two.

pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index of the character that starts at or before `offset` code units.
///
/// Offsets past the end clamp to `s.len()`. An offset that falls between the two
/// halves of a surrogate pair rounds down to the start of that character.
pub fn byte_index(s: &str, offset: usize) -> usize {
    let mut units = 0usize;
    for (ix, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > offset {
            return ix;
        }
        units = next;
    }
    s.len()
}

pub fn slice_utf16(s: &str, start: usize, end: usize) -> &str {
    let start = byte_index(s, start);
    let end = byte_index(s, end).max(start);
    &s[start..end]
}

/// Splits `s` into the text before `start`, between `start..end` and after `end`.
pub fn split_utf16(s: &str, start: usize, end: usize) -> (&str, &str, &str) {
    let start = byte_index(s, start);
    let end = byte_index(s, end).max(start);
    (&s[..start], &s[start..end], &s[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_surrogate_pairs_as_two_units() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("a😀b"), 4);
        assert_eq!(utf16_len("é"), 1);
    }

    #[test]
    fn byte_index_clamps_and_rounds_down_inside_pairs() {
        let s = "a😀b";
        assert_eq!(byte_index(s, 0), 0);
        assert_eq!(byte_index(s, 1), 1);
        assert_eq!(byte_index(s, 2), 1);
        assert_eq!(byte_index(s, 3), 5);
        assert_eq!(byte_index(s, 4), 6);
        assert_eq!(byte_index(s, 99), 6);
    }

    #[test]
    fn split_produces_three_pieces() {
        assert_eq!(split_utf16("HELLO WORLD", 6, 11), ("HELLO ", "WORLD", ""));
        assert_eq!(split_utf16("héllo", 1, 3), ("h", "él", "lo"));
        assert_eq!(slice_utf16("a😀b", 1, 3), "😀");
    }

    #[test]
    fn reversed_offsets_yield_empty_middle() {
        assert_eq!(split_utf16("abcdef", 4, 2), ("abcd", "", "ef"));
    }
}
