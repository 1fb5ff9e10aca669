//! `#hashtag`.

use super::chars::{char_before, is_decimal_digit, is_hash_sign, is_letter_or_mark};

/// Joiners and marks allowed inside a hashtag body besides letters, marks
/// and digits.
fn is_hashtag_joiner(c: char) -> bool {
    matches!(c,
        '_'
        | '\u{200C}'
        | '\u{200D}'
        | '\u{A67E}'
        | '\u{05BE}'
        | '\u{05F3}'
        | '\u{05F4}'
        | '\u{FF5E}'
        | '\u{301C}'
        | '\u{309B}'
        | '\u{309C}'
        | '\u{30A0}'
        | '\u{30FB}'
        | '\u{3003}'
        | '\u{0F0B}'
        | '\u{0F0C}'
        | '\u{00B7}'
    )
}

/// Byte end of a hashtag whose `#`/`＃` sits at `pos`.
///
/// The body needs at least one letter or mark, so `#123` is not a hashtag.
pub fn match_hashtag(text: &str, pos: usize) -> Option<usize> {
    let sign = text[pos..].chars().next().filter(|&c| is_hash_sign(c))?;
    let body = &text[pos + sign.len_utf8()..];
    if body.starts_with(['\u{FE0F}', '\u{20E3}']) {
        return None;
    }

    let mut end = pos + sign.len_utf8();
    let mut has_letter = false;
    for c in body.chars() {
        if is_letter_or_mark(c) {
            has_letter = true;
        } else if !(is_decimal_digit(c) || is_hashtag_joiner(c)) {
            break;
        }
        end += c.len_utf8();
    }
    has_letter.then_some(end)
}

/// A hashtag may not follow `&` (HTML entities) or glue onto a word.
pub fn valid_hashtag_predecessor(text: &str, pos: usize) -> bool {
    match char_before(text, pos) {
        None | Some('\u{FE0E}') | Some('\u{FE0F}') => true,
        Some(c) => c != '&' && !is_letter_or_mark(c),
    }
}

/// `#http://...` is a URL with a stray `#`, never a hashtag.
pub fn precedes_protocol(text: &str, body_start: usize) -> bool {
    let rest = &text[body_start..];
    ["http://", "https://", "HTTP://", "HTTPS://"].iter().any(|p| rest.starts_with(p))
}
