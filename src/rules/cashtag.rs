//! `$CASHTAG`.

use super::chars::{char_before, is_space};

pub const MAX_CASHTAG_LEN: usize = 6;

fn ascii_letters(bytes: &[u8], start: usize, max: usize) -> usize {
    bytes[start.min(bytes.len())..].iter().take(max).take_while(|b| b.is_ascii_alphabetic()).count()
}

/// Byte end of a cashtag whose `$` sits at `pos`: 1-6 letters, optionally
/// followed by `.` or `_` and 1-2 letters (`$BRK.A`).
pub fn match_cashtag(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b'$') {
        return None;
    }
    let symbol_len = ascii_letters(bytes, pos + 1, MAX_CASHTAG_LEN);
    if symbol_len == 0 {
        return None;
    }
    let mut end = pos + 1 + symbol_len;

    if matches!(bytes.get(end), Some(b'.') | Some(b'_')) {
        let suffix_len = ascii_letters(bytes, end + 1, 2);
        if suffix_len > 0 {
            end += 1 + suffix_len;
        }
    }

    if bytes.get(end).is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(end)
}

/// Cashtags only start a word.
pub fn valid_cashtag_predecessor(text: &str, pos: usize) -> bool {
    char_before(text, pos).is_none_or(is_space)
}
